//! Terminal stand-in for a phone controller.
//!
//! ```text
//! PAD_CONTROLLER_ADDR=127.0.0.1:3000 cargo run -p pad-server --example controller
//! >> d up      (key down)
//! >> u up      (key up)
//! ```

use std::env;
use std::io::{self, Write};

use pad_core::Command;
use pad_protocol::{
    decode_server_line, encode_client_frame, ClientFrame, CommandPayload, ServerFrame,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Where to connect: env override or default.
    let addr = env::var("PAD_CONTROLLER_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    println!("Connecting to {}...", addr);
    let stream = TcpStream::connect(&addr).await?;
    let (read_half, mut write_half) = stream.into_split();

    // Print whatever the relay sends us.
    tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match decode_server_line(&line) {
                Ok(ServerFrame::Welcome(w)) => {
                    println!("<< joined {} as {} ({} keys)", w.game, w.slot, w.keys)
                }
                Ok(ServerFrame::Rejected { reason }) => println!("<< rejected: {:?}", reason),
                Ok(ServerFrame::Command(c)) => println!("<< peer {:?} {}", c.event, c.key),
                Err(e) => eprintln!("<< undecodable frame: {e}"),
            }
        }
        println!("Connection closed by relay.");
    });

    println!("Type `d <key>` for key down, `u <key>` for key up, `quit` to leave.\n");
    let stdin = io::stdin();

    loop {
        print!(">> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            println!("\nEOF on stdin, exiting controller.");
            break;
        }

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        let command = match trimmed.split_once(' ') {
            Some(("d", key)) => Command::down(key.trim()),
            Some(("u", key)) => Command::up(key.trim()),
            _ => {
                eprintln!("Expected `d <key>` or `u <key>`.");
                continue;
            }
        };

        let mut frame = encode_client_frame(&ClientFrame::Command(CommandPayload::from(&command)))?;
        frame.push('\n');
        write_half.write_all(frame.as_bytes()).await?;
    }

    Ok(())
}
