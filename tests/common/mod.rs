use assert_cmd::Command;

pub fn newme_bin() -> Command {
    #[allow(deprecated)]
    {
        Command::cargo_bin("newme").expect("newme test binary should build")
    }
}
