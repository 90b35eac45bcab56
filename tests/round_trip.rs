use formcrypt::{cipher, CipherAlgorithm, DomainOptions, FpeAlgorithm, FpeError, KeyMaterial};

const KEY_HEX: &str = "0123456789012345678901234567890123456789012345678901234567890123";
const IV: &[u8; 16] = b"fedcba9876543210";
const CARD: &str = "4916 1234 5678 9012";

fn key() -> Vec<u8> {
    hex::decode(KEY_HEX).unwrap()
}

#[test]
fn test_card_number_round_trip_with_additional_separator() {
    let options = DomainOptions::preset("digits").with_additional(" ");
    let mut ctx = cipher(
        &key(),
        IV,
        Some("prefix-substitution"),
        Some("aes-256-cbc"),
        Some(&options),
    )
    .unwrap();

    let encrypted = ctx.encrypt(CARD).unwrap();
    assert_eq!(encrypted.chars().count(), CARD.chars().count());
    assert!(encrypted.chars().all(|c| c.is_ascii_digit() || c == ' '));
    assert_eq!(ctx.decrypt(&encrypted).unwrap(), CARD);
}

#[test]
fn test_card_number_separator_rejected_without_permission() {
    let options = DomainOptions::preset("digits");
    let mut ctx = cipher(&key(), IV, None, None, Some(&options)).unwrap();
    assert!(matches!(ctx.encrypt(CARD), Err(FpeError::Domain(_))));
}

#[test]
fn test_card_number_round_trip_with_residual() {
    let options = DomainOptions::preset("digits").with_residual();
    let mut ctx = cipher(&key(), IV, None, None, Some(&options)).unwrap();
    let encrypted = ctx.encrypt(CARD).unwrap();
    assert_eq!(ctx.decrypt(&encrypted).unwrap(), CARD);
    assert!(ctx.domain().contains(' '));
}

#[test]
fn test_every_algorithm_pair_round_trips() {
    let text = "The quick brown fox, 1234!";
    for fpe in FpeAlgorithm::ALL {
        for alg in CipherAlgorithm::ALL {
            let keys = KeyMaterial::generate(alg).unwrap();
            let options = DomainOptions::preset("printable");
            let mut ctx =
                formcrypt::cipher_with(keys, Some(fpe.name()), Some(alg.name()), Some(&options))
                    .unwrap();
            let encrypted = ctx.encrypt(text).unwrap();
            assert_eq!(encrypted.chars().count(), text.chars().count(), "{fpe}/{alg}");
            assert_eq!(ctx.decrypt(&encrypted).unwrap(), text, "{fpe}/{alg}");
        }
    }
}

#[test]
fn test_every_preset_round_trips() {
    for preset in formcrypt::presets::PRESETS {
        let options = DomainOptions::preset(preset.name);
        let mut ctx = cipher(&key(), IV, None, None, Some(&options)).unwrap();
        let text: String = preset.sets.concat();
        let encrypted = ctx.encrypt(&text).unwrap();
        assert_eq!(ctx.decrypt(&encrypted).unwrap(), text, "{}", preset.name);
    }
}

#[test]
fn test_unicode_input_domain() {
    let options = DomainOptions::input("αβγδεζηθ");
    let mut ctx = cipher(&key(), IV, Some("feistel-network"), None, Some(&options)).unwrap();
    let encrypted = ctx.encrypt("θηζεδγβα").unwrap();
    assert_eq!(encrypted.chars().count(), 8);
    assert_eq!(ctx.decrypt(&encrypted).unwrap(), "θηζεδγβα");
}

#[test]
fn test_empty_input_is_rejected() {
    let mut ctx = cipher(&key(), IV, None, None, Some(&DomainOptions::preset("digits"))).unwrap();
    assert!(matches!(ctx.encrypt(""), Err(FpeError::Input(_))));
    assert!(matches!(ctx.decrypt(""), Err(FpeError::Input(_))));
}
