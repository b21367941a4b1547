use std::env;

use crate::error::{UngzError, UngzResult};

#[derive(Debug, Clone)]
pub struct UngzArgs {
    pub files: Vec<String>,
    pub stdout: bool,
    pub test: bool,
    pub list: bool,
    pub keep: bool,
    pub force: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub verbosity: u8,
    pub recursive: bool,
    pub suffix: String,
    pub help: bool,
    pub version: bool,
    pub license: bool,
}

impl Default for UngzArgs {
    fn default() -> Self {
        UngzArgs {
            files: Vec::new(),
            stdout: false,
            test: false,
            list: false,
            keep: false,
            force: false,
            quiet: false,
            verbose: false,
            verbosity: 1,
            recursive: false,
            suffix: ".gz".to_string(),
            help: false,
            version: false,
            license: false,
        }
    }
}

impl UngzArgs {
    pub fn parse() -> UngzResult<Self> {
        let mut argv: Vec<String> = env::args().collect();
        argv.remove(0); // Remove program name

        // gzip-compatible environment options come first
        if let Ok(gzip_env) = env::var("GZIP") {
            let gzip_args = parse_env_args(&gzip_env);
            argv.splice(0..0, gzip_args);
        }

        Self::parse_from(argv)
    }

    pub fn parse_from(argv: Vec<String>) -> UngzResult<Self> {
        let mut args = UngzArgs::default();
        let mut i = 0;
        let mut in_options = true;

        while i < argv.len() {
            let arg = &argv[i];

            if !in_options || !arg.starts_with('-') {
                args.files.push(arg.clone());
                i += 1;
                continue;
            }

            if arg == "--" {
                in_options = false;
                i += 1;
                continue;
            }

            if arg == "-" {
                args.files.push(arg.clone());
                i += 1;
                continue;
            }

            if arg.starts_with("--") {
                match arg.as_str() {
                    "--help" => args.help = true,
                    "--version" => args.version = true,
                    "--license" => args.license = true,
                    // Decompression is all this tool does.
                    "--decompress" | "--uncompress" => {}
                    "--test" => args.test = true,
                    "--list" => args.list = true,
                    "--stdout" | "--to-stdout" => args.stdout = true,
                    "--keep" => args.keep = true,
                    "--force" => args.force = true,
                    "--quiet" | "--silent" => {
                        args.quiet = true;
                        args.verbosity = 0;
                    }
                    "--verbose" => {
                        args.verbose = true;
                        args.verbosity = 2;
                    }
                    "--recursive" => args.recursive = true,
                    _ => {
                        if let Some(value) = arg.strip_prefix("--suffix=") {
                            args.suffix = value.to_string();
                        } else if arg == "--suffix" {
                            if i + 1 >= argv.len() {
                                return Err(UngzError::invalid_argument(format!(
                                    "{} requires an argument",
                                    arg
                                )));
                            }
                            i += 1;
                            args.suffix = argv[i].clone();
                        } else {
                            return Err(UngzError::invalid_argument(format!(
                                "unknown option: {}",
                                arg
                            )));
                        }
                    }
                }
            } else {
                let chars: Vec<char> = arg.chars().collect();
                let mut j = 1; // Skip the initial '-'

                while j < chars.len() {
                    match chars[j] {
                        'h' => args.help = true,
                        'V' => args.version = true,
                        'L' => args.license = true,
                        'd' => {}
                        't' => args.test = true,
                        'l' => args.list = true,
                        'c' => args.stdout = true,
                        'k' => args.keep = true,
                        'f' => args.force = true,
                        'q' => {
                            args.quiet = true;
                            args.verbosity = 0;
                        }
                        'v' => {
                            args.verbose = true;
                            args.verbosity += 1;
                        }
                        'r' => args.recursive = true,
                        'S' => {
                            // Value is the rest of this argument or the next one
                            let value = if j + 1 < chars.len() {
                                let value: String = chars[j + 1..].iter().collect();
                                j = chars.len();
                                value
                            } else {
                                if i + 1 >= argv.len() {
                                    return Err(UngzError::invalid_argument(
                                        "-S requires an argument",
                                    ));
                                }
                                i += 1;
                                argv[i].clone()
                            };
                            args.suffix = value;
                        }
                        _ => {
                            return Err(UngzError::invalid_argument(format!(
                                "unknown option: -{}",
                                chars[j]
                            )))
                        }
                    }
                    j += 1;
                }
            }

            i += 1;
        }

        if args.suffix.is_empty() {
            return Err(UngzError::invalid_argument("suffix must not be empty"));
        }

        Ok(args)
    }
}

fn parse_env_args(env_str: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current_arg = String::new();
    let mut in_quotes = false;

    for ch in env_str.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ' ' | '\t' if !in_quotes => {
                if !current_arg.is_empty() {
                    args.push(current_arg.clone());
                    current_arg.clear();
                }
            }
            _ => current_arg.push(ch),
        }
    }

    if !current_arg.is_empty() {
        args.push(current_arg);
    }

    args
}
