mod common;

use proompt_core::AnyEmptyResult;
use rstest::rstest;

#[rstest]
#[case::proompt_toml("proompt.toml")]
#[case::dot_proompt_toml(".proompt.toml")]
#[case::dot_config_proompt_toml(".config/proompt.toml")]
fn resolve_reads_values_from_config(#[case] config_file: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(
		tmp.path().join(config_file),
		"[values]\naudience = \"engineers\"\n",
	)?;
	let template = tmp.path().join("prompt.md");
	std::fs::write(&template, "Written for {{audience}}")?;

	common::proompt_cmd()
		.arg("resolve")
		.arg(&template)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("Written for engineers");

	Ok(())
}

#[test]
fn resolve_prefers_proompt_toml_over_other_candidates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(tmp.path().join("proompt.toml"), "[values]\nwho = \"root\"\n")?;
	std::fs::write(tmp.path().join(".proompt.toml"), "[values]\nwho = \"dot\"\n")?;
	std::fs::write(
		tmp.path().join(".config/proompt.toml"),
		"[values]\nwho = \"config\"\n",
	)?;
	let template = tmp.path().join("prompt.md");
	std::fs::write(&template, "{{who}}")?;

	common::proompt_cmd()
		.arg("resolve")
		.arg(&template)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("root");

	Ok(())
}

#[rstest]
#[case::config_only(false, false, "config")]
#[case::values_file_beats_config(true, false, "file")]
#[case::var_beats_everything(true, true, "var")]
#[case::var_beats_config(false, true, "var")]
fn value_sources_are_layered(
	#[case] with_values_file: bool,
	#[case] with_var: bool,
	#[case] expected: &str,
) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("proompt.toml"),
		"[values]\nwho = \"config\"\nextra = \"kept\"\n",
	)?;
	std::fs::write(tmp.path().join("values.json"), r#"{"who": "file"}"#)?;
	let template = tmp.path().join("prompt.md");
	std::fs::write(&template, "{{who}} {{extra}}")?;

	let mut cmd = common::proompt_cmd();
	cmd.arg("resolve").arg(&template).arg("--path").arg(tmp.path());
	if with_values_file {
		cmd.arg("--values").arg(tmp.path().join("values.json"));
	}
	if with_var {
		cmd.arg("--var").arg("who=var");
	}

	cmd.assert().success().stdout(format!("{expected} kept"));

	Ok(())
}

#[test]
fn resolve_reads_toml_values_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("values.toml"),
		"name = \"Ada\"\ncount = 3\nready = true\n",
	)?;
	let template = tmp.path().join("prompt.md");
	std::fs::write(&template, "{{name}} has {{count}} ({{ready}})")?;

	common::proompt_cmd()
		.arg("resolve")
		.arg(&template)
		.arg("--values")
		.arg(tmp.path().join("values.toml"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("Ada has 3 (true)");

	Ok(())
}

#[test]
fn resolve_rejects_unsupported_values_format() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("values.yaml"), "name: Ada\n")?;
	let template = tmp.path().join("prompt.md");
	std::fs::write(&template, "{{name}}")?;

	common::proompt_cmd()
		.arg("resolve")
		.arg(&template)
		.arg("--values")
		.arg(tmp.path().join("values.yaml"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unsupported values file format"));

	Ok(())
}

#[test]
fn resolve_rejects_nested_values() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("values.json"), r#"{"name": {"first": "Ada"}}"#)?;
	let template = tmp.path().join("prompt.md");
	std::fs::write(&template, "{{name}}")?;

	common::proompt_cmd()
		.arg("resolve")
		.arg(&template)
		.arg("--values")
		.arg(tmp.path().join("values.json"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to load values file"));

	Ok(())
}

#[test]
fn resolve_reports_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("proompt.toml"), "[preview]\nunknown = 1\n")?;
	let template = tmp.path().join("prompt.md");
	std::fs::write(&template, "{{name}}")?;

	common::proompt_cmd()
		.arg("resolve")
		.arg(&template)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}
