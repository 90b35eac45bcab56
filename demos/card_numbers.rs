//! Minimal example: tokenising card numbers.
//!
//! Run with: `cargo run --example card_numbers`
//!
//! - Digits are permuted, spaces pass through the same table.
//! - A second context built from the exported domain state decrypts.

use formcrypt::{cipher, presets, DomainOptions, DomainState, KeyMaterial};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup
    let keys = KeyMaterial::generate(formcrypt::CipherAlgorithm::Aes256Cbc)?;
    let options = DomainOptions::preset("digits").with_residual();
    let mut ctx = formcrypt::cipher_with(keys, None, None, Some(&options))?;

    // 2. Encrypt
    let cards = ["4916 1234 5678 9012", "5500-0000-0000-0004"];
    for card in cards {
        let token = ctx.encrypt(card)?;
        println!("{card} -> {token}");
    }

    // 3. Persist the grown domain alongside the tokens
    let state_json = ctx.domain_state().to_json()?;
    println!("domain state: {state_json}");

    // 4. Decrypt in a context built from fixed key material
    let key = [0x2a; 32];
    let iv = [0x17; 16];
    let mut writer = cipher(&key, &iv, None, None, Some(&options))?;
    let token = writer.encrypt(cards[1])?;

    let mut reader = cipher(&key, &iv, None, None, Some(&options))?;
    reader.restore(&DomainState::from_json(&writer.domain_state().to_json()?)?)?;
    assert_eq!(reader.decrypt(&token)?, cards[1]);
    println!("restored context decrypted {token}");

    println!("\n{}", presets());
    Ok(())
}
