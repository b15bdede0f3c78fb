//! Blueprint Language Server binary.
//!
//! Serves the Language Server Protocol for `.bp` requirement documents
//! over stdio, for use with any LSP-compatible editor.
//!
//! Usage:
//!   blueprint-lsp \[options\]
//!
//! Options:
//!   --stdio      Use stdio for communication (default)
//!   --log        Enable trace logging to stderr
//!   --health     Quick health check
//!   --version    Show version information
//!   --help       Show this help message

use anyhow::Context;
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut enable_logging = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stdio" => {}
            "--log" => enable_logging = true,
            "--health" => {
                println!("ok {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "--version" => {
                println!("blueprint-lsp {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if enable_logging {
        eprintln!("Blueprint Language Server starting...");
    }

    match blueprint_lsp::server::run_stdio().context("failed to serve LSP over stdio") {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("blueprint-lsp: {err:#}");
            process::exit(1);
        }
    }
}

fn print_help() {
    println!("blueprint-lsp - Language server for the Blueprint requirements DSL");
    println!();
    println!("Usage: blueprint-lsp [options]");
    println!();
    println!("Options:");
    println!("  --stdio      Use stdio for communication (default)");
    println!("  --log        Enable trace logging to stderr");
    println!("  --health     Quick health check");
    println!("  --version    Show version information");
    println!("  --help       Show this help message");
}
