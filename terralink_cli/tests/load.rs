mod common;

use similar_asserts::assert_eq;
use terralink_core::AnyEmptyResult;

const PRODUCTION_MODULE: &str = r#"module "vpc" {
  # terralink: path=../modules/vpc
  source = "registry/vpc/aws"
  version = "2.1.0"
}
"#;

const LOADED_MODULE: &str = r#"module "vpc" {
  # terralink: path=../modules/vpc
  # terralink-state: source="registry/vpc/aws" version="2.1.0"
  source = "../modules/vpc"
}
"#;

#[test]
fn load_rewrites_annotated_modules() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("main.tf");
	std::fs::write(&path, PRODUCTION_MODULE)?;

	let mut cmd = common::terralink_cmd();
	cmd.arg("load")
		.arg("--dir")
		.arg(tmp.path())
		.arg("--ignore-dir")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("loaded"));

	assert_eq!(std::fs::read_to_string(&path)?, LOADED_MODULE);

	Ok(())
}

#[test]
fn load_is_idempotent() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("main.tf");
	std::fs::write(&path, PRODUCTION_MODULE)?;

	for _ in 0..2 {
		let mut cmd = common::terralink_cmd();
		cmd.arg("load")
			.arg("--dir")
			.arg(tmp.path())
			.arg("--ignore-dir")
			.arg(tmp.path())
			.assert()
			.success();
	}

	assert_eq!(std::fs::read_to_string(&path)?, LOADED_MODULE);

	Ok(())
}

#[test]
fn load_ignores_unannotated_modules() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let content = "module \"plain\" {\n  source = \"registry/plain/aws\"\n}\n";
	let path = tmp.path().join("main.tf");
	std::fs::write(&path, content)?;

	let mut cmd = common::terralink_cmd();
	cmd.arg("load")
		.arg("--dir")
		.arg(tmp.path())
		.arg("--ignore-dir")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Nothing to do"));

	assert_eq!(std::fs::read_to_string(&path)?, content);

	Ok(())
}

#[test]
fn load_respects_ignore_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".terralinkignore"), "vendored\n")?;

	let vendored = tmp.path().join("vendored");
	std::fs::create_dir(&vendored)?;
	let path = vendored.join("main.tf");
	std::fs::write(&path, PRODUCTION_MODULE)?;

	let mut cmd = common::terralink_cmd();
	cmd.arg("load")
		.arg("--dir")
		.arg(tmp.path())
		.arg("--ignore-dir")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Nothing to do"));

	assert_eq!(std::fs::read_to_string(&path)?, PRODUCTION_MODULE);

	Ok(())
}

#[test]
fn load_exits_2_when_source_is_missing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let content = "module \"vpc\" {\n  # terralink: path=../modules/vpc\n  count = 1\n}\n";
	let path = tmp.path().join("main.tf");
	std::fs::write(&path, content)?;

	let mut cmd = common::terralink_cmd();
	cmd.arg("load")
		.arg("--dir")
		.arg(tmp.path())
		.arg("--ignore-dir")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no source attribute"));

	// The failing file is left exactly as found.
	assert_eq!(std::fs::read_to_string(&path)?, content);

	Ok(())
}
