mod app;
mod audio;
mod catalog;
mod config;
mod error;
mod library;
mod player;
mod runtime;
mod store;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(pos) = args.iter().position(|a| a == "--set-token") {
        let Some(token) = args.get(pos + 1) else {
            return Err("--set-token needs a value".into());
        };
        runtime::store_token(token)?;
        println!("dropbeat: access token saved");
        return Ok(());
    }

    if args.iter().any(|a| a == "--print-config") {
        let (settings, problem) = runtime::load_settings();
        if let Some(msg) = problem {
            eprintln!("dropbeat: {msg}");
        }
        print!("{}", toml::to_string_pretty(&settings)?);
        return Ok(());
    }

    runtime::run()
}
