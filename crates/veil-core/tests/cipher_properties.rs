mod common;

use common::engine;
use proptest::prelude::*;
use veil_core::crypto::{is_encrypted, HEADER};
use veil_core::VeilError;

fn password() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%^&*_-]{1,24}"
}

proptest! {
    // Every case pays for two key derivations.
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_round_trip(plaintext in any::<String>(), password in password()) {
        let engine = engine();
        let blob = engine.encrypt(&plaintext, &password).unwrap();
        prop_assert!(is_encrypted(&blob));
        prop_assert_eq!(engine.decrypt(&blob, &password).unwrap(), plaintext);
    }

    #[test]
    fn test_wrong_password_never_decrypts(
        plaintext in any::<String>(),
        first in password(),
        second in password(),
    ) {
        prop_assume!(first != second);
        let engine = engine();
        let blob = engine.encrypt(&plaintext, &first).unwrap();
        prop_assert!(matches!(
            engine.decrypt(&blob, &second),
            Err(VeilError::Authentication)
        ));
    }

    #[test]
    fn test_encryption_is_randomized(plaintext in any::<String>(), password in password()) {
        let engine = engine();
        let one = engine.encrypt(&plaintext, &password).unwrap();
        let two = engine.encrypt(&plaintext, &password).unwrap();
        prop_assert_ne!(one, two);
    }

    #[test]
    fn test_headerless_content_is_plaintext(content in any::<String>()) {
        prop_assume!(!content.starts_with(HEADER));
        prop_assert!(!is_encrypted(&content));
    }
}
