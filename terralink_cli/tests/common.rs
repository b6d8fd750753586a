use assert_cmd::Command;

pub fn terralink_cmd() -> Command {
	let mut cmd = Command::cargo_bin("terralink").expect("terralink binary builds");
	cmd.env("NO_COLOR", "1");
	cmd
}
