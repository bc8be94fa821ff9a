use clap::{Parser as ClapParser, Subcommand};
use parsley::{
    Engine, Value,
    cli::{self, CliError, EvalOptions},
    output,
};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "parsley")]
#[command(about = "Parsley - compile and evaluate sandboxed template expressions")]
#[command(version)]
struct Cli {
    /// Log compilation and cache activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression against a JSON context
    Eval {
        /// The expression to evaluate
        expression: String,

        /// JSON context (reads from stdin if not provided)
        #[arg(short, long)]
        context: Option<String>,

        /// JSON locals that shadow the context
        #[arg(short, long)]
        locals: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Also print the context after evaluation
        #[arg(long)]
        show_context: bool,
    },

    /// Compile an expression and report its properties without running it
    Check {
        /// The expression to check
        expression: String,
    },

    /// Print the tokens of an expression
    Tokens {
        /// The expression to tokenize
        expression: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let engine = Engine::default();
    let result = match cli.command {
        Commands::Eval {
            expression,
            context,
            locals,
            pretty,
            show_context,
        } => run_eval(&engine, expression, context, locals, pretty, show_context),
        Commands::Check { expression } => run_check(&engine, &expression),
        Commands::Tokens { expression } => run_tokens(&expression),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("parsley=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_eval(
    engine: &Engine,
    expression: String,
    context: Option<String>,
    locals: Option<String>,
    pretty: bool,
    show_context: bool,
) -> Result<(), CliError> {
    let context = match context {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer).filter(|s| !s.trim().is_empty())
        }
        None => None,
    };

    let options = EvalOptions {
        expression,
        context,
        locals,
    };
    let output = cli::execute_eval(engine, &options)?;

    println!("{}", render(&output.result, pretty));
    if show_context {
        println!("{}", render(&output.context, pretty));
    }
    Ok(())
}

fn render(value: &Value, pretty: bool) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        _ if pretty => output::to_json_pretty(value),
        _ => output::to_json(value),
    }
}

fn run_check(engine: &Engine, expression: &str) -> Result<(), CliError> {
    let report = cli::execute_check(engine, expression)?;
    println!("Syntax is valid");
    println!("literal: {}", report.literal);
    println!("constant: {}", report.constant);
    println!("assignable: {}", report.assignable);
    Ok(())
}

fn run_tokens(expression: &str) -> Result<(), CliError> {
    for token in cli::execute_tokens(expression)? {
        println!("{:>4}  {:<10}  {}", token.position, token.kind, token.text);
    }
    Ok(())
}
