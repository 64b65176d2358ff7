use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("strata")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Strata Contributors")
        .about("Extract per-level search records from HTML pages")
        .arg(clap::arg!(<INPUT> "Local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-c --config <FILE> "Site config file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-u --url <URL> "URL the page was fetched from, used to pick the selectors set")
                .value_hint(clap::ValueHint::Url),
        )
        .arg(clap::arg!(-e --encoding <LABEL> "Declared character encoding of the input (default: sniffed from the document)"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, text, txt)")
                .value_name("FORMAT")
                .default_value("json")
                .value_parser(["json", "text", "txt"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "strata", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "strata", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "strata", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "strata", &completions_dir).unwrap();
}
