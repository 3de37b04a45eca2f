//! Interactive client menu
//!
//! 연결 하나를 유지한 채 calc/gpt 요청을 반복해서 보낸다.

use anyhow::Context;
use serde_json::Value;
use tiercache_core::client::{calc_payload, gpt_payload};
use tiercache_core::Session;
use tiercache_foundation::ClientSettings;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

const SAMPLES: [&str; 5] = ["1+2", "2*3", "sqrt(2)", "10/2", "sqrt(9)"];

/// stdin 한 줄씩 읽기
struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// 프롬프트 출력 후 한 줄 입력. EOF면 None
    async fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }
}

pub async fn run(settings: &ClientSettings, port: Option<u16>) -> anyhow::Result<()> {
    let mut prompter = Prompter::new();

    let port = match port {
        Some(port) => port,
        None => {
            println!("No port was given, choose where to connect:");
            println!("1) Direct server on port {}", settings.server_port);
            println!("2) Proxy on port {}", settings.proxy_port);
            match prompter.ask("Choose option (1-2) [1]: ").await?.as_deref() {
                Some("2") => settings.proxy_port,
                Some(_) => settings.server_port,
                None => return Ok(()),
            }
        }
    };

    let addr = format!("{}:{}", settings.host, port);
    let mut session = Session::connect(&addr, settings.connect_timeout)
        .await
        .with_context(|| format!("failed to connect to {}", addr))?;
    println!("[client] connected to {}", session.addr());

    loop {
        println!("\n=== Client menu ===");
        println!("1) Calc expression");
        println!("2) GPT prompt");
        println!("3) Exit");
        let Some(choice) = prompter.ask("Choose option (1-3): ").await? else {
            break;
        };

        let payload = match choice.as_str() {
            "3" => {
                println!("[client] closing connection, bye.");
                break;
            }
            "1" => match read_expression(&mut prompter).await? {
                Some(expr) => calc_payload(&expr, true),
                None => continue,
            },
            "2" => {
                println!("\nGPT mode:");
                match prompter.ask("Enter prompt text: ").await? {
                    Some(prompt) if !prompt.is_empty() => gpt_payload(&prompt, true),
                    _ => {
                        println!("Empty prompt, try again.");
                        continue;
                    }
                }
            }
            _ => {
                println!("Unknown option, please choose 1/2/3.");
                continue;
            }
        };

        match session.send(&payload).await? {
            Some(reply) => print_reply(&reply),
            None => {
                println!("[client] {} closed the connection.", session.addr());
                break;
            }
        }
    }

    Ok(())
}

/// 샘플 선택 또는 직접 입력. 잘못된 입력이면 None
async fn read_expression(prompter: &mut Prompter) -> anyhow::Result<Option<String>> {
    println!("\nCalc mode:");
    println!("1) Use sample expression");
    println!("2) Enter custom expression");
    let sub = prompter.ask("Choose option (1-2): ").await?.unwrap_or_default();

    if sub == "1" {
        println!("\nSample expressions:");
        for (i, expr) in SAMPLES.iter().enumerate() {
            println!("{}) {}", i + 1, expr);
        }
        let idx = prompter.ask("Choose sample (1-5): ").await?.unwrap_or_default();
        return match idx.parse::<usize>().ok().and_then(|i| i.checked_sub(1)).and_then(|i| SAMPLES.get(i)) {
            Some(expr) => Ok(Some(expr.to_string())),
            None => {
                println!("Invalid choice, try again.");
                Ok(None)
            }
        };
    }

    match prompter.ask("Enter expression: ").await? {
        Some(expr) if !expr.is_empty() => Ok(Some(expr)),
        _ => {
            println!("Empty expression, try again.");
            Ok(None)
        }
    }
}

fn print_reply(reply: &Value) {
    if reply.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        println!("\n[server] OK");
        println!("result: {}", display_value(reply.get("result")));
        let meta = reply.get("meta").cloned().unwrap_or_else(|| Value::Object(Default::default()));
        println!("meta: {}", meta);
    } else {
        println!("\n[server] ERROR");
        println!("error: {}", display_value(reply.get("error")));
    }
}

/// 문자열은 따옴표 없이, 나머지는 JSON 그대로
fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "None".to_string(),
    }
}
