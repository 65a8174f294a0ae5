use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::info;

use switchkit::client::{
    command_path, split_mangled_name, CommandOutcome, ControlClient, PersistentLogin,
    SwitchCommandRequest, CONTROLLER_HOST, CONTROLLER_PORT,
};

#[derive(Parser, Debug)]
#[command(name = "swcmd")]
#[command(about = "Send an administrative command to a switch")]
#[command(version)]
struct Args {
    /// Directory the switch is registered under
    #[arg(short = 'd', value_name = "DIRECTORY")]
    directory: Option<String>,

    /// Switch name; accepts mangled `name;directory` composites
    #[arg(short = 's', value_name = "SWITCH")]
    switch: Option<String>,

    /// Command to issue
    #[arg(short = 'c', value_name = "COMMAND")]
    command: Option<String>,

    /// Admin username
    #[arg(short = 'u', value_name = "USERNAME", default_value = "admin")]
    admin_username: String,

    /// Admin password
    #[arg(short = 'p', value_name = "PASSWORD", default_value = "admin")]
    admin_password: String,

    /// Arguments forwarded to the command
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Args::parse();

    let mut directory = cli.directory.clone();
    let mut switch = None;
    if let Some(raw) = cli.switch.as_deref() {
        let (dir_override, name) = split_mangled_name(raw);
        if let Some(dir) = dir_override {
            // Mangled names override -d; preserved quirk, see DESIGN.md.
            directory = Some(dir);
        }
        switch = Some(name);
    }

    let (Some(directory), Some(switch), Some(command)) =
        (directory, switch, cli.command.clone())
    else {
        // Required flag missing: show usage and exit non-zero.
        Args::command().print_help()?;
        std::process::exit(2);
    };

    let request = SwitchCommandRequest {
        directory,
        switch,
        command,
        args: cli.args.clone(),
        admin_username: cli.admin_username.clone(),
        admin_password: cli.admin_password.clone(),
    };
    info!(
        directory = %request.directory,
        switch = %request.switch,
        command = %request.command,
        "Built switch command request"
    );

    println!("Logging into web service at {CONTROLLER_HOST}:{CONTROLLER_PORT}...");
    let login = PersistentLogin::new(CONTROLLER_HOST, CONTROLLER_PORT)?;
    let client = ControlClient::connect(
        CONTROLLER_HOST,
        CONTROLLER_PORT,
        &login,
        &request.admin_username,
        &request.admin_password,
    )
    .await?;
    println!("done");

    println!("Issuing:");
    println!("\t{}", command_path(&request.directory, &request.switch));

    // Exit status stays 0 on a failed command; the body is the report.
    match client.send_switch_command(&request).await? {
        CommandOutcome::Success => println!("Command sent successfully"),
        CommandOutcome::Failure(body) => println!("Error: {body}"),
    }

    Ok(())
}
