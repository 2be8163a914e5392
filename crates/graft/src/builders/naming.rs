//! Identifier case conversion and the per-module name set.

/// Converts a snake_case name to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Converts a PascalCase or camelCase name to snake_case.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Converts a name to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Every spelling of a module name the builders need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNames {
    /// `blog_post`, used in file names and artifact ids.
    pub snake: String,
    /// `BlogPost`
    pub pascal: String,
    /// `blogPost`
    pub camel: String,
    /// `blog-post`
    pub kebab: String,
}

impl EntityNames {
    pub fn new(name: &str) -> Self {
        let snake = to_snake_case(name);
        Self {
            pascal: to_pascal_case(&snake),
            camel: to_camel_case(&snake),
            kebab: snake.replace('_', "-"),
            snake,
        }
    }

    /// REST collection path, `/blog-posts`.
    pub fn resource_path(&self) -> String {
        format!("/{}s", self.kebab)
    }

    /// Plural display name, `BlogPosts`.
    pub fn plural(&self) -> String {
        format!("{}s", self.pascal)
    }
}
