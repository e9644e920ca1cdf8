use dice_formula::{DiceFormulaOptions, MarkdownStringifier, RollMode};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
Enter a formula such as `2d6+5` or `1d20!`, optionally preceded by flags:
  /adv[N] /dis[N] /attack /crit /fumble /vicious /explode /md";

/// Splits leading `/flag` words off a line.
fn parse_flags(line: &str) -> Result<(DiceFormulaOptions, bool, &str), String> {
    let mut options = DiceFormulaOptions::default();
    let mut markdown = false;
    let mut rest = line.trim();

    while let Some(flag) = rest.strip_prefix('/') {
        let (word, tail) = flag.split_once(char::is_whitespace).unwrap_or((flag, ""));
        let level = |prefix: &str| -> Result<i32, String> {
            let n = &word[prefix.len()..];
            if n.is_empty() {
                Ok(1)
            } else {
                n.parse().map_err(|_| format!("bad level in /{}", word))
            }
        };
        options = match word {
            "attack" => DiceFormulaOptions {
                mode: RollMode::Attack,
                ..options
            },
            "crit" => options.with_criticals(),
            "fumble" => options.with_fumbles(),
            "vicious" => options.with_vicious(),
            "explode" => options.with_explode_all(),
            "md" => {
                markdown = true;
                options
            }
            w if w.starts_with("adv") => options.with_advantage(level("adv")?),
            w if w.starts_with("dis") => options.with_advantage(-level("dis")?),
            _ => return Err(format!("unknown flag /{}", word)),
        };
        rest = tail.trim_start();
    }

    Ok((options, markdown, rest))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dice_formula=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    println!("{}", HELP);
    let stdin = io::stdin();
    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            match parse_flags(&line) {
                Ok((options, markdown, formula)) => match dice_formula::evaluate(formula, &options) {
                    Ok(r) => {
                        if markdown {
                            println!("{}", r.stringify::<MarkdownStringifier>());
                        } else {
                            println!("{}", r.display_string);
                        }
                        if r.num_criticals > 0 {
                            println!("  criticals: {}", r.num_criticals);
                        }
                        if r.is_fumble {
                            println!("  fumble!");
                        }
                        if r.is_miss {
                            println!("  miss!");
                        }
                    }
                    Err(why) => eprintln!("Error: {}", why),
                },
                Err(why) => eprintln!("Error: {}", why),
            }
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}
