use super::*;
use clap::CommandFactory;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

#[test]
fn command_definition_is_valid() {
    Args::command().debug_assert();
}

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["persona-chat"]);
    assert!(args.command.is_none());
    assert!(args.model.is_none());
}

#[test]
fn global_flags_apply_after_subcommand() {
    let args = parse_args(&[
        "persona-chat",
        "list",
        "--data-dir",
        "/tmp/personas",
        "-m",
        "gemini-2.5-pro",
    ]);
    assert_eq!(args.command, Some(Commands::List));
    assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/personas")));
    assert_eq!(args.model.as_deref(), Some("gemini-2.5-pro"));
}

#[test]
fn say_collects_prompt_words() {
    let args = parse_args(&["persona-chat", "say", "-p", "Zen Guide", "I", "feel", "stressed."]);
    assert_eq!(
        args.command,
        Some(Commands::Say {
            persona: "Zen Guide".to_string(),
            prompt: vec!["I".into(), "feel".into(), "stressed.".into()],
        })
    );
}

#[test]
fn say_requires_a_prompt() {
    assert!(Args::try_parse_from(["persona-chat", "say", "-p", "2"]).is_err());
}
