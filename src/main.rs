use std::process::ExitCode;

mod app;
mod cli;
mod config;
mod display;
mod env_file;
mod fixer;
mod interact;
mod logger;
mod run_loop;
mod runner;

fn main() -> ExitCode {
    app::main()
}
