use clap::Parser as ClapParser;
use csvlang::cli::{generate_completions, Args, Commands};
use csvlang::config::AppConfig;
use csvlang::diagnostic::render_diagnostics;
use csvlang::interpreter::{Interpreter, Parser, ParserError};
use csvlang::lexer::Lexer;
use csvlang::token::TokenKind;
use owo_colors::OwoColorize;
use std::path::Path;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);

    let Some(path) = &args.path else {
        println!("Please provide a file path using the --path flag.");
        return;
    };

    verbose_log(&config, &format!("Running script: {}", path.display()));

    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            error_message(&config, &format!("Error reading file: {}", e));
            std::process::exit(1);
        }
    };

    if args.dump_tokens {
        dump_tokens(&source);
        return;
    }

    let mut parser = Parser::new(Lexer::new(&source));
    let program = parser.parse_program();
    if !parser.errors.is_empty() {
        report_parse_errors(&source, path, &parser.errors, &config);
        return;
    }

    if args.dump_ast {
        println!("{}", program);
        return;
    }

    verbose_log(
        &config,
        &format!("Parsed {} statement(s)", program.statements.len()),
    );

    let mut interpreter = Interpreter::new();
    for stmt in &program.statements {
        match interpreter.eval_statement(stmt) {
            Ok(Some(value)) => println!("{}", value),
            Ok(None) => {}
            Err(e) => {
                error_message(&config, &format!("ERROR: {}", e));
                return;
            }
        }
    }
}

fn dump_tokens(source: &str) {
    let mut lexer = Lexer::new(source);
    loop {
        let token = lexer.next_token();
        println!(
            "{:>4}:{:<4} {:?} {:?}",
            token.line, token.column, token.kind, token.literal
        );
        if token.kind == TokenKind::Eof {
            break;
        }
    }
}

fn report_parse_errors(source: &str, path: &Path, errors: &[ParserError], config: &AppConfig) {
    // all language diagnostics go to stdout
    println!("csvlang found {} parse error(s); the script was not run.", errors.len());
    let file_name = path.display().to_string();
    let diagnostics: Vec<_> = errors
        .iter()
        .map(|e| {
            let mut diagnostic = e.to_diagnostic();
            if config.verbose {
                diagnostic = diagnostic.with_note(format!("captured at:\n{}", e.stack));
            }
            diagnostic
        })
        .collect();
    print!(
        "{}",
        render_diagnostics(source, &file_name, &diagnostics, config.color_enabled)
    );
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[csvlang:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        println!("{}", message.red().bold());
    } else {
        println!("{}", message);
    }
}
