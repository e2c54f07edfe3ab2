//! Property tests for registry sealing and key derivation.

use lexflow_crypto::{
    derive_key, open, seal, CryptoError, KdfParams, RegistryKey, Salt, MIN_SEALED_SIZE,
    NONCE_SIZE, TAG_SIZE,
};
use proptest::prelude::*;

fn fast() -> KdfParams {
    KdfParams {
        log_n: 8,
        r: 8,
        p: 1,
    }
}

proptest! {
    #[test]
    fn seal_open_roundtrip(plaintext in prop::collection::vec(any::<u8>(), 0..4096)) {
        let key = RegistryKey::generate();
        let sealed = seal(&key, &plaintext).unwrap();
        prop_assert_eq!(sealed.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);
        prop_assert_eq!(open(&key, &sealed).unwrap(), plaintext);
    }

    #[test]
    fn any_single_bit_flip_is_detected(
        plaintext in prop::collection::vec(any::<u8>(), 0..512),
        idx in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = RegistryKey::generate();
        let mut sealed = seal(&key, &plaintext).unwrap();
        let i = idx.index(sealed.len());
        sealed[i] ^= 1 << bit;
        prop_assert!(matches!(open(&key, &sealed), Err(CryptoError::Unauthentic)));
    }

    #[test]
    fn short_input_never_decrypts(bytes in prop::collection::vec(any::<u8>(), 0..MIN_SEALED_SIZE)) {
        let key = RegistryKey::generate();
        let is_truncated = matches!(open(&key, &bytes), Err(CryptoError::Truncated { .. }));
        prop_assert!(is_truncated);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn derivation_is_deterministic(
        password in "[ -~]{1,64}",
        salt in prop::array::uniform32(any::<u8>()),
    ) {
        let salt = Salt::from_bytes(salt);
        let a = derive_key(&password, &salt, &fast()).unwrap();
        let b = derive_key(&password, &salt, &fast()).unwrap();
        prop_assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn distinct_passwords_give_distinct_keys(
        a in "[a-z]{8,16}",
        b in "[A-Z]{8,16}",
    ) {
        let salt = Salt::random();
        let ka = derive_key(&a, &salt, &fast()).unwrap();
        let kb = derive_key(&b, &salt, &fast()).unwrap();
        prop_assert_ne!(ka.as_bytes(), kb.as_bytes());
    }
}
