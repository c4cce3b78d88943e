use clap::Parser;
use mypdf2txt::{Cli, OutputFormatter, OutputMode, Pdf2Txt, Pdf2TxtError, UserFriendlyError};
use std::path::Path;
use std::process;

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli);

    let exit_code = run(&cli);
    process::exit(exit_code);
}

fn run(cli: &Cli) -> i32 {
    if cli.generate_config {
        return handle_generate_config(cli);
    }

    // Checked before loading config or looking for the tool.
    if let Some(ref pdf_file) = cli.pdf_file {
        if !pdf_file.exists() {
            let formatter = OutputFormatter::new(cli.output_mode(), 0, false);
            formatter.error(&format!("File {} does not exist", pdf_file.display()));
            return exit_code_for(&Pdf2TxtError::FileNotFound {
                path: pdf_file.clone(),
            });
        }
    }

    let app = match Pdf2Txt::from_cli(cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e, cli.output_mode());
            return exit_code_for(&e);
        }
    };

    if cli.install.is_some() {
        return handle_install(&app);
    }

    if cli.locate {
        return handle_locate(&app);
    }

    match cli.pdf_file {
        Some(ref pdf_file) => handle_extract(&app, pdf_file),
        None => 1,
    }
}

fn handle_extract(app: &Pdf2Txt, pdf_file: &Path) -> i32 {
    match app.extract(pdf_file) {
        Ok(extraction) => {
            app.output_formatter().print_extraction(&extraction);
            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn handle_install(app: &Pdf2Txt) -> i32 {
    match app.install() {
        Ok(report) => {
            app.output_formatter().print_install_report(&report);
            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn handle_locate(app: &Pdf2Txt) -> i32 {
    match app.locate() {
        Ok(path) => {
            let user_space = app.is_user_space_install(&path);
            app.output_formatter().print_tool_location(&path, user_space);
            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "mypdf2txt.toml".to_string());

    match Pdf2Txt::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  mypdf2txt <file.pdf> --config {}", config_path);
            println!("\nEdit the file to change the OCR language, DPI or search paths.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn exit_code_for(error: &Pdf2TxtError) -> i32 {
    match error {
        Pdf2TxtError::Config { .. } => 2,
        Pdf2TxtError::FileNotFound { .. } => 3,
        e if e.is_tool_not_found() => 4,
        Pdf2TxtError::Execution { .. } => 5,
        Pdf2TxtError::UnsupportedPlatform { .. } => 6,
        Pdf2TxtError::SourceNotFound { .. }
        | Pdf2TxtError::InstallSource { .. }
        | Pdf2TxtError::InstallDestination { .. }
        | Pdf2TxtError::UserDataDirUnavailable => 7,
        _ => 1,
    }
}

fn print_startup_error(error: &Pdf2TxtError, mode: OutputMode) {
    let formatter = OutputFormatter::new(mode, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(cli: &Cli) {
    let env = env_logger::Env::default().default_filter_or(cli.log_filter());
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}
