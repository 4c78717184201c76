use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("fencetag")
        .version(env!("CARGO_PKG_VERSION"))
        .author("fencetag Contributors")
        .about("Convert articles to Markdown with language-tagged code blocks")
        .arg(clap::arg!(<INPUT> "HTML or Markdown file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (markdown, json)")
                .value_name("FORMAT")
                .default_value("markdown")
                .value_parser(["markdown", "json"]),
        )
        .arg(
            clap::arg!(--from <KIND> "Input kind (html, markdown)")
                .value_name("KIND")
                .value_parser(["html", "markdown"]),
        )
        .arg(clap::arg!(--"source-url" <URL> "URL the document was fetched from").value_name("URL"))
        .arg(clap::arg!(--frontmatter "Include TOML frontmatter"))
        .arg(clap::arg!(--"no-title" "Omit the title heading"))
        .arg(clap::arg!(--"no-header" "Omit the source/author/date header block"))
        .arg(clap::arg!(--"min-confidence" <NUM> "Minimum confidence for classified languages"))
        .arg(clap::arg!(--"context-lines" <NUM> "Lines of surrounding prose used as classification context"))
        .arg(clap::arg!(--"no-annotate" "Skip stamping language classes onto code elements"))
        .arg(clap::arg!(--"no-extract" "Convert the whole page instead of its main content"))
        .arg(
            clap::arg!(--config <FILE> "Configuration file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_name("SHELL")
                .value_parser(["bash", "zsh", "fish", "powershell"]),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "fencetag", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "fencetag", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "fencetag", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "fencetag", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
