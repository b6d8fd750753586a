use crate::Document;

/// Parse fixture content into a document rooted at a dummy path.
pub fn parse_fixture(content: &str) -> Document {
	Document::parse("test.tf", content).expect("fixture content must parse")
}

/// A managed module in production mode, version attribute present.
pub fn managed_module_with_version() -> &'static str {
	r#"module "test" {
  # terralink: path=../local
  source  = "remote/source"
  version = "1.0.0"
}
"#
}

/// A managed module in production mode without a version attribute.
pub fn managed_module_without_version() -> &'static str {
	r#"module "test" {
  # terralink: path=../local
  source = "remote/source"
}
"#
}

/// A managed module already in development mode.
pub fn loaded_module_with_version() -> &'static str {
	r#"module "test" {
  # terralink: path=../local
  # terralink-state: source="remote/source" version="1.0.0"
  source = "../local"
}
"#
}

/// A module with no annotations at all.
pub fn unmanaged_module() -> &'static str {
	r#"module "test" {
  source  = "remote/source"
  version = "1.0.0"
}
"#
}

/// A managed module whose body has nested expressions containing
/// `source` and `version` identifiers that must never be rewritten.
pub fn managed_module_with_nested_expressions() -> &'static str {
	r#"module "test" {
  # terralink: path=../local
  source  = "remote/source"
  version = "1.0.0"

  settings = {
    source  = "inner/source"
    version = "9.9.9"
  }

  rendered = join("-", [local.source, local.version])
}
"#
}
