use lexflow_crypto::CryptoError;

#[test]
fn error_messages() {
    assert!(CryptoError::Kdf("invalid r".into()).to_string().contains("invalid r"));
    assert!(CryptoError::Seal("aead".into()).to_string().contains("sealing failed"));
    assert!(CryptoError::Unauthentic.to_string().contains("wrong key"));

    let msg = CryptoError::SaltLength {
        expected: 32,
        actual: 5,
    }
    .to_string();
    assert!(msg.contains("32") && msg.contains('5'));

    let msg = CryptoError::Truncated { min: 28, actual: 3 }.to_string();
    assert!(msg.contains("28") && msg.contains('3'));
}

#[test]
fn error_debug_names_variant() {
    assert!(format!("{:?}", CryptoError::Unauthentic).contains("Unauthentic"));
}
