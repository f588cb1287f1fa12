//! Minimal bootstrap: an application exposing one custom command plus the
//! bundled generator, driven through the kernel.
//!
//! ```text
//! cargo run --example greet -- greet Ada --shout
//! cargo run --example greet -- generate SyncCommand
//! ```

use std::rc::Rc;

use clap::{Arg, ArgAction, ArgMatches};
use drover::{Application, Command, Kernel, OutputBuffer};

struct GreetCommand;

impl Command for GreetCommand {
    fn definition(&self) -> clap::Command {
        clap::Command::new("greet")
            .about("Greet somebody")
            .arg(Arg::new("who").default_value("world"))
            .arg(
                Arg::new("shout")
                    .long("shout")
                    .action(ArgAction::SetTrue)
                    .help("Print the greeting in capitals"),
            )
    }

    fn handle(&mut self, matches: &ArgMatches, out: &mut OutputBuffer) -> anyhow::Result<i32> {
        let who = matches.get_one::<String>("who").expect("defaulted");
        let mut greeting = format!("Hello, {}!", who);
        if matches.get_flag("shout") {
            greeting = greeting.to_uppercase();
        }
        out.line(&greeting);
        Ok(0)
    }
}

fn main() -> Result<(), drover::Error> {
    let app = Rc::new(Application::builder().build()?);
    app.bind_command("greet", || GreetCommand);
    app.register_commands(["greet", "generate"]);

    let mut kernel = Kernel::new(app);
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let code = kernel.handle(&argv)?;
    print!("{}", kernel.output());
    std::process::exit(code);
}
