use smf_player::Player;

/// Prints every message of a format 0 MIDI file with the delay that follows it, without waiting.
fn main() -> ! {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: smf_player <file.mid>");
            std::process::exit(2)
        }
    };
    let print = |message: &[u8]| {
        let hex: Vec<String> = message.iter().map(|b| format!("{:02X}", b)).collect();
        println!("{}", hex.join(" "));
    };
    let mut player = match Player::load(&path, print) {
        Ok(player) => player,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1)
        }
    };
    println!(
        "resolution {}, first delay {} ticks",
        player.header().resolution(),
        player.pending_delta()
    );
    loop {
        match player.step() {
            Ok(delay) => println!("  wait {} ticks ({} us)", delay.ticks(), delay.micros()),
            Err(e) => {
                if !e.is_eof() {
                    eprintln!("{}", e);
                }
                break;
            }
        }
    }
    drop(player.close());
    std::process::exit(0)
}
