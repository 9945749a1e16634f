//! The `protoc-gen-tagwire` plugin binary.
//!
//! With no arguments, reads a binary `CodeGeneratorRequest` on stdin and
//! writes a binary `CodeGeneratorResponse` on stdout, as `protoc` expects.

use std::io;
use std::process::ExitCode;

const USAGE: &str = "\
protoc-gen-tagwire: protoc plugin emitting tagwire property table modules.

Usage:
  protoc --plugin=protoc-gen-tagwire --tagwire_out=OPTIONS:DIR file.proto
  protoc-gen-tagwire --version
  protoc-gen-tagwire --help

Options (comma separated in the protoc parameter string):
  plugins=grpc                record the grpc plugin flag
  gen_descriptors=true        embed raw file descriptors in generated modules
  using_value_wrappers=true   collapse single-field *Value wrapper messages

With no arguments the plugin reads a CodeGeneratorRequest on stdin and
writes a CodeGeneratorResponse on stdout.
";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--version") => {
            println!("protoc-gen-tagwire {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Some("-h") | Some("--help") => {
            print!("{USAGE}");
            ExitCode::SUCCESS
        }
        Some(other) => {
            eprintln!("unrecognized argument '{other}'\n\n{USAGE}");
            ExitCode::from(2)
        }
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            match tagwire_gen::plugin::run(&mut stdin.lock(), &mut stdout.lock()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("protoc-gen-tagwire: {err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
