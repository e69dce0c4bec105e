use homc_drv::{run, Config};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {}", error);
            std::process::exit(2);
        }
    };

    match run(&config) {
        Ok(output) => {
            print!("{}", output.stdout);
            eprint!("{}", output.report);
            std::process::exit(output.exit_code);
        }
        Err(error) => {
            eprintln!("error: {:#}", error);
            std::process::exit(2);
        }
    }
}
