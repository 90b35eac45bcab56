use formcrypt::{cipher, CipherContext, DomainOptions, FpeAlgorithm};

fn build(key: &[u8], fpe: FpeAlgorithm) -> CipherContext {
    let options = DomainOptions::preset("alphanumeric");
    cipher(key, &[3u8; 16], Some(fpe.name()), Some("aes-256-cbc"), Some(&options)).unwrap()
}

#[test]
fn test_identical_parameters_give_identical_tables() {
    for fpe in FpeAlgorithm::ALL {
        let mut a = build(&[1u8; 32], fpe);
        let mut b = build(&[1u8; 32], fpe);
        assert_eq!(a.table(), b.table(), "{fpe}");
        assert_eq!(a.encrypt("Account42").unwrap(), b.encrypt("Account42").unwrap());
    }
}

#[test]
fn test_different_keys_give_different_tables() {
    for fpe in FpeAlgorithm::ALL {
        let a = build(&[1u8; 32], fpe);
        let b = build(&[2u8; 32], fpe);
        assert_ne!(a.table(), b.table(), "{fpe}");
    }
}

#[test]
fn test_algorithms_differ_from_each_other() {
    let prefix = build(&[1u8; 32], FpeAlgorithm::PrefixSubstitution);
    let cycle = build(&[1u8; 32], FpeAlgorithm::CycleWalking);
    let feistel = build(&[1u8; 32], FpeAlgorithm::FeistelNetwork);
    assert_ne!(prefix.table(), cycle.table());
    assert_ne!(cycle.table(), feistel.table());
}

#[test]
fn test_declared_order_does_not_change_the_table() {
    let forward = DomainOptions::input("0123456789");
    let reversed = DomainOptions::input("9876543210");
    let a = cipher(&[4u8; 32], &[5u8; 16], None, None, Some(&forward)).unwrap();
    let b = cipher(&[4u8; 32], &[5u8; 16], None, None, Some(&reversed)).unwrap();
    assert_eq!(a.table(), b.table());
    assert_ne!(a.domain().as_string(), b.domain().as_string());
}
