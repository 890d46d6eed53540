use clap::{Args, Parser};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        env = "CODEPACK_ROOT",
        help = "Specify the project directory to pack (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Path of the TOML config file (default: .codepack/codepack.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "disable_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<PathBuf>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub disable_config_file: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputOpts {
    #[arg(
        short = 'o',
        long,
        help = "Output file name [default: codebase.md].",
        value_name = "NAME",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "How to render the project structure section.",
        value_name = "MODE",
        value_parser = ["native", "external", "off"],
        help_heading = "Output Control"
    )]
    pub tree: Option<String>,

    #[arg(
        long,
        help = "Write root-relative paths in file headers.",
        help_heading = "Output Control"
    )]
    pub relative_paths: bool,

    #[arg(
        long,
        help = "Skip files larger than SIZE (e.g. '512KB', '2MiB').",
        value_name = "SIZE",
        help_heading = "Output Control"
    )]
    pub max_file_size: Option<String>,

    #[arg(
        long,
        help = "Stop on the first unreadable file instead of skipping it.",
        help_heading = "Output Control"
    )]
    pub abort_on_read_error: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct IgnoreTogglesGroup {
    #[arg(
        long,
        help = "Respect the project's .gitignore [default: enabled].",
        overrides_with = "disable_gitignore",
        help_heading = "Ignore Rules"
    )]
    pub enable_gitignore: bool,
    #[arg(
        long,
        help = "Do not read the project's .gitignore.",
        overrides_with = "enable_gitignore",
        help_heading = "Ignore Rules"
    )]
    pub disable_gitignore: bool,

    #[arg(
        long,
        help = "Apply the built-in default rules (e.g. node_modules, *.lock) [default: enabled].",
        overrides_with = "disable_builtin_rules",
        help_heading = "Ignore Rules"
    )]
    pub enable_builtin_rules: bool,
    #[arg(
        long,
        help = "Leave the built-in default rules out.",
        overrides_with = "enable_builtin_rules",
        help_heading = "Ignore Rules"
    )]
    pub disable_builtin_rules: bool,

    #[arg(
        long,
        help = "Do not create .cpignore when it is missing.",
        help_heading = "Ignore Rules"
    )]
    pub no_init_ignore: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Pack a project's text files into one document.",
    long_about = "codepack walks the project directory, skips everything matched by .cpignore \nand .gitignore rules, and writes a directory tree followed by the content of \nevery text file into a single Markdown file for humans or LLMs.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  codepack\n  codepack -o context.md --tree external\n  codepack --dry-run -f json"
)]
pub struct Cli {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub output_opts: OutputOpts,
    #[clap(flatten)]
    pub ignore_toggles: IgnoreTogglesGroup,

    #[arg(
        long,
        help = "List the files that would be packed without writing anything.",
        help_heading = "Output Control"
    )]
    pub dry_run: bool,

    #[arg(
        short = 'f',
        long,
        help = "Format of the dry-run report and run summary.",
        value_name = "FORMAT",
        value_parser = ["text", "json"],
        help_heading = "Output Control"
    )]
    pub format: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}
