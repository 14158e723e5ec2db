//! Property tests for the codec and permission matching

use hrguard::{mask, permission, Config, CryptoCodec, MaskKind};
use proptest::prelude::*;

fn codec() -> CryptoCodec {
    let key = "5a".repeat(32);
    CryptoCodec::from_config(&Config::new(key, "prop-salt")).unwrap()
}

proptest! {
    #[test]
    fn decrypt_inverts_encrypt(p in "\\PC{0,64}") {
        let c = codec();
        let ct = c.encrypt(&p).unwrap();
        prop_assert_eq!(c.decrypt(&ct).unwrap(), p);
    }

    #[test]
    fn ciphertext_varies_but_hash_does_not(p in "\\PC{1,32}") {
        let c = codec();
        prop_assert_ne!(c.encrypt(&p).unwrap(), c.encrypt(&p).unwrap());
        prop_assert_eq!(c.hash_for_search(&p), c.hash_for_search(&p));
    }

    #[test]
    fn distinct_plaintexts_hash_differently(a in "[0-9]{11}", b in "[0-9]{11}") {
        prop_assume!(a != b);
        let c = codec();
        prop_assert_ne!(c.hash_for_search(&a), c.hash_for_search(&b));
    }

    #[test]
    fn phone_mask_keeps_ends(p in "1[3-9][0-9]{9}") {
        let m = mask(&p, MaskKind::Phone);
        prop_assert_eq!(&m[..3], &p[..3]);
        prop_assert_eq!(&m[7..], &p[7..]);
        prop_assert_eq!(&m[3..7], "****");
    }

    #[test]
    fn mask_preserves_length(p in "\\PC{0,40}") {
        for kind in [MaskKind::Phone, MaskKind::NationalId, MaskKind::BankCard, MaskKind::Name, MaskKind::Generic] {
            prop_assert_eq!(mask(&p, kind).chars().count(), p.chars().count());
        }
    }

    #[test]
    fn resource_wildcard_never_crosses_resources(res in "[a-z]{1,8}", other in "[a-z]{1,8}", action in "[a-z_]{1,10}") {
        prop_assume!(res != other);
        let granted = format!("{}.*", res);
        let required = format!("{}.{}", other, action);
        prop_assert!(!permission::matches([granted.as_str()], &required));
    }
}
