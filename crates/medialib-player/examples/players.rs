//! Run with: cargo run -p medialib-player --example players
//!
//! Lists the embedded-mode players installed on this machine.

fn main() {
    let db = medialib_player::PlayerDatabase::embedded();
    let players = medialib_player::platform::installed(&db);

    if players.is_empty() {
        println!("No supported media players found on PATH.");
    } else {
        for (def, path) in &players {
            let resume = if def.can_resume() {
                "resumes from stored position"
            } else {
                "always starts from the beginning"
            };
            println!("Player: {}", def.name);
            println!("  Path: {}", path.display());
            println!("  {resume}");
            println!();
        }
    }
}
