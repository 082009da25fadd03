mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;

use chainval::*;

const ISSUER_URI: &str = "http://ca.test/issuing.crt";
const ROOT_URI: &str = "http://ca.test/root.crt";
const CRL_URI: &str = "http://ca.test/issuing.crl";
const ROOT_CRL_URI: &str = "http://ca.test/root.crl";

const ROOT_SKID: &[u8] = &[0x0f];
const ISSUING_SKID: &[u8] = &[0x1c];
const LEAF_SKID: &[u8] = &[0x1e];
const LEAF_SERIAL: &[u8] = &[0x33, 0x44];

fn environment(settings: VerifierSettings, fetcher: &StaticFetcher) -> TrustEnvironment {
    let mut te = TrustEnvironment::new(settings);
    te.add_fetcher(Box::new(fetcher.clone()));
    te
}

fn sequential() -> VerifierSettings {
    let mut vs = VerifierSettings::default();
    vs.set_parallel_crl_fetch(false);
    vs
}

fn root_cert() -> Vec<u8> {
    CertTemplate::new("Root", &[0x01])
        .skid(ROOT_SKID)
        .akid(ROOT_SKID)
        .crl_dp(ROOT_CRL_URI)
        .build()
}

fn issuing_cert() -> Vec<u8> {
    CertTemplate::new("Issuing CA", &[0x02])
        .issuer("Root")
        .skid(ISSUING_SKID)
        .akid(ROOT_SKID)
        .ca_issuer(ROOT_URI)
        .crl_dp(ROOT_CRL_URI)
        .build()
}

fn leaf_template() -> CertTemplate {
    CertTemplate::new("Leaf", LEAF_SERIAL)
        .issuer("Issuing CA")
        .skid(LEAF_SKID)
        .akid(ISSUING_SKID)
        .ca_issuer(ISSUER_URI)
        .crl_dp(CRL_URI)
}

/// Leaf -> Issuing CA -> Root. The issuing CA's CRL lists the leaf when `revoke` is true.
fn three_tier(revoke: bool) -> StaticFetcher {
    let fetcher = StaticFetcher::new();
    fetcher.add_resource(ISSUER_URI, &issuing_cert());
    fetcher.add_resource(ROOT_URI, &root_cert());
    let listed = if revoke {
        LEAF_SERIAL.to_vec()
    } else {
        vec![0x77]
    };
    fetcher.add_resource(CRL_URI, &build_crl("Issuing CA", &[listed]));
    fetcher.add_resource(ROOT_CRL_URI, &build_crl("Root", &[vec![0x09]]));
    fetcher
}

#[tokio::test]
async fn trusted_then_cleared() {
    // lone certificate with SKID 0A and no AIA
    let der = CertTemplate::new("Lone", &[0x05]).skid(&[0x0a]).build();
    let te = TrustEnvironment::default();

    assert_eq!(VerificationResult::Untrusted, te.verify_buffer(&der).await);
    let chain = te.register_buffer(&der).await.unwrap();
    assert_eq!(1, chain.len());
    assert!(te.registry().contains("0A").await);
    assert_eq!(VerificationResult::Trusted, te.verify_buffer(&der).await);

    te.clear().await;
    assert!(te.registry().is_empty().await);
    assert_eq!(VerificationResult::Untrusted, te.verify_buffer(&der).await);
}

#[tokio::test]
async fn register_is_idempotent() {
    let fetcher = three_tier(false);
    let te = environment(VerifierSettings::default(), &fetcher);
    let leaf = leaf_template().build();

    let chain = te.register_buffer(&leaf).await.unwrap();
    assert_eq!(3, chain.len());
    let snapshot = te.registry().snapshot().await;
    assert_eq!(
        vec!["0F".to_string(), "1C".to_string(), "1E".to_string()],
        snapshot
    );

    te.register_buffer(&leaf).await.unwrap();
    assert_eq!(snapshot, te.registry().snapshot().await);
}

#[tokio::test]
async fn register_root_trusts_issued_certificates() {
    let fetcher = three_tier(false);
    let te = environment(sequential(), &fetcher);

    let chain = te.register_buffer(&root_cert()).await.unwrap();
    assert_eq!("CN=Root", chain.root().subject);
    assert_eq!(chain.leaf(), chain.root());

    // chain of the leaf includes the root's SKID
    assert_eq!(
        VerificationResult::Trusted,
        te.verify_buffer(&leaf_template().build()).await
    );

    // a certificate that names the root only in its AKID and has no AIA is trusted as well
    let orphan = CertTemplate::new("Orphan", &[0x06])
        .issuer("Root")
        .akid(ROOT_SKID)
        .build();
    assert_eq!(VerificationResult::Trusted, te.verify_buffer(&orphan).await);

    let stranger = CertTemplate::new("Stranger", &[0x07]).skid(&[0x99]).build();
    assert_eq!(
        VerificationResult::Untrusted,
        te.verify_buffer(&stranger).await
    );
}

#[tokio::test]
async fn register_returns_resolved_root() {
    let fetcher = three_tier(false);
    let te = environment(VerifierSettings::default(), &fetcher);
    let chain = te.register_buffer(&leaf_template().build()).await.unwrap();
    assert_eq!("CN=Leaf", chain.leaf().subject);
    assert_eq!("CN=Root", chain.root().subject);
    assert_eq!(ROOT_URI, chain.root().locator);
    assert_eq!(ISSUER_URI, chain.certificates[1].locator);
}

#[tokio::test]
async fn expired_regardless_of_trust() {
    let now = get_now_as_unix_epoch().unwrap();
    let der = CertTemplate::new("Expired", &[0x08])
        .skid(&[0x0b])
        .validity(now - 400 * DAY, now - DAY)
        .crl_dp("http://unreachable.test/crl")
        .build();
    let te = TrustEnvironment::default();
    te.register_buffer(&der).await.unwrap();
    assert_eq!(VerificationResult::Expired, te.verify_buffer(&der).await);
}

#[tokio::test]
async fn not_yet_valid() {
    let now = get_now_as_unix_epoch().unwrap();
    let der = CertTemplate::new("Future", &[0x09])
        .skid(&[0x0c])
        .validity(now + DAY, now + 400 * DAY)
        .build();
    let te = TrustEnvironment::default();
    te.register_buffer(&der).await.unwrap();
    assert_eq!(VerificationResult::NotYetValid, te.verify_buffer(&der).await);
}

#[tokio::test]
async fn time_of_interest_override() {
    let now = get_now_as_unix_epoch().unwrap();
    let der = CertTemplate::new("Expired", &[0x0a])
        .skid(&[0x0d])
        .validity(now - 400 * DAY, now - DAY)
        .build();

    // zero disables validity checks
    let mut vs = VerifierSettings::default();
    vs.set_time_of_interest(0);
    let te = TrustEnvironment::new(vs);
    te.register_buffer(&der).await.unwrap();
    assert_eq!(VerificationResult::Trusted, te.verify_buffer(&der).await);

    // a time within the validity period
    let mut vs = VerifierSettings::default();
    vs.set_time_of_interest(now - 200 * DAY);
    let te = TrustEnvironment::new(vs);
    assert_eq!(VerificationResult::Untrusted, te.verify_buffer(&der).await);
}

#[tokio::test]
async fn trusted_three_tier() {
    for settings in [VerifierSettings::default(), sequential()] {
        let fetcher = three_tier(false);
        let te = environment(settings, &fetcher);
        te.register_buffer(&root_cert()).await.unwrap();
        assert_eq!(
            VerificationResult::Trusted,
            te.verify_buffer(&leaf_template().build()).await
        );
        assert_eq!(1, fetcher.fetch_count(CRL_URI));
        // root CRL is named by the issuing CA and the root but fetched once
        assert_eq!(1, fetcher.fetch_count(ROOT_CRL_URI));
    }
}

#[tokio::test]
async fn revoked_overrides_trust() {
    for settings in [VerifierSettings::default(), sequential()] {
        let fetcher = three_tier(true);
        let te = environment(settings, &fetcher);
        let leaf = leaf_template().build();
        te.register_buffer(&leaf).await.unwrap();
        assert_eq!(VerificationResult::Revoked, te.verify_buffer(&leaf).await);
    }
}

#[tokio::test]
async fn revoked_with_unreachable_sibling_crl() {
    let fetcher = three_tier(true);
    fetcher.add_failure(ROOT_CRL_URI, "connection refused");

    // sequential order checks the issuing CA's CRL first
    let te = environment(sequential(), &fetcher);
    assert_eq!(
        VerificationResult::Revoked,
        te.verify_buffer(&leaf_template().build()).await
    );

    // parallel retrieval still reports the revocation despite the failure
    let te = environment(VerifierSettings::default(), &fetcher);
    assert_eq!(
        VerificationResult::Revoked,
        te.verify_buffer(&leaf_template().build()).await
    );
}

#[tokio::test]
async fn revoked_when_failure_precedes_listing() {
    let fetcher = three_tier(true);
    fetcher.add_failure("http://ca.test/first.crl", "connection refused");
    let leaf = CertTemplate::new("Leaf", LEAF_SERIAL)
        .skid(LEAF_SKID)
        .ca_issuer(ISSUER_URI)
        .crl_dp("http://ca.test/first.crl")
        .crl_dp(CRL_URI)
        .build();
    let te = environment(sequential(), &fetcher);
    assert_eq!(VerificationResult::Revoked, te.verify_buffer(&leaf).await);
}

#[tokio::test]
async fn unreachable_crl_is_an_error() {
    for settings in [VerifierSettings::default(), sequential()] {
        let fetcher = three_tier(false);
        fetcher.add_failure(CRL_URI, "connection refused");
        let te = environment(settings, &fetcher);
        let leaf = leaf_template().build();
        te.register_buffer(&leaf).await.unwrap();
        match te.verify_buffer(&leaf).await {
            VerificationResult::Error(Error::RevocationCheck(msg)) => {
                assert!(msg.contains(CRL_URI))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[tokio::test]
async fn malformed_crl_is_an_error() {
    let fetcher = three_tier(false);
    fetcher.add_resource(CRL_URI, b"not a crl");
    let te = environment(VerifierSettings::default(), &fetcher);
    assert!(matches!(
        te.verify_buffer(&leaf_template().build()).await,
        VerificationResult::Error(Error::RevocationCheck(_))
    ));
}

#[tokio::test]
async fn crl_timeout_is_an_error() {
    let fetcher = three_tier(false);
    fetcher.add_delayed_resource(
        CRL_URI,
        Duration::from_secs(30),
        &build_crl("Issuing CA", &[]),
    );
    let mut vs = VerifierSettings::default();
    vs.set_crl_timeout(Duration::from_millis(100));
    let te = environment(vs, &fetcher);
    assert!(matches!(
        te.verify_buffer(&leaf_template().build()).await,
        VerificationResult::Error(Error::RevocationCheck(_))
    ));
}

#[tokio::test]
async fn revocation_checking_disabled() {
    let fetcher = three_tier(true);
    fetcher.add_failure(ROOT_CRL_URI, "connection refused");
    let mut vs = VerifierSettings::default();
    vs.set_check_revocation_status(false);
    let te = environment(vs, &fetcher);
    let leaf = leaf_template().build();
    te.register_buffer(&leaf).await.unwrap();
    assert_eq!(VerificationResult::Trusted, te.verify_buffer(&leaf).await);
    assert_eq!(0, fetcher.fetch_count(CRL_URI));
}

#[tokio::test]
async fn issuer_timeout_is_an_error() {
    let fetcher = three_tier(false);
    fetcher.add_delayed_resource(ISSUER_URI, Duration::from_secs(30), &issuing_cert());
    let mut vs = VerifierSettings::default();
    vs.set_fetch_timeout(Duration::from_millis(100));
    let te = environment(vs, &fetcher);
    te.register_buffer(&root_cert()).await.unwrap();

    let r = te.verify_buffer(&leaf_template().build()).await;
    assert_eq!(
        VerificationResult::Error(Error::Timeout(ISSUER_URI.to_string())),
        r
    );
    assert_ne!(VerificationResult::Untrusted, r);
}

#[tokio::test]
async fn issuer_network_failure_is_an_error() {
    let fetcher = three_tier(false);
    fetcher.add_failure(ISSUER_URI, "connection refused");
    let te = environment(VerifierSettings::default(), &fetcher);
    assert!(matches!(
        te.verify_buffer(&leaf_template().build()).await,
        VerificationResult::Error(Error::NetworkError(_))
    ));
    assert!(matches!(
        te.register_buffer(&leaf_template().build()).await,
        Err(Error::NetworkError(_))
    ));
    assert!(te.registry().is_empty().await);
}

#[tokio::test]
async fn issuer_parse_failure_is_an_error() {
    let fetcher = three_tier(false);
    fetcher.add_resource(ISSUER_URI, b"<html>not found</html>");
    let te = environment(VerifierSettings::default(), &fetcher);
    assert_eq!(
        VerificationResult::Error(Error::ParseError),
        te.verify_buffer(&leaf_template().build()).await
    );
}

#[tokio::test]
async fn issuer_without_fetcher_is_an_error() {
    let te = TrustEnvironment::default();
    assert_eq!(
        VerificationResult::Error(Error::InvalidUriScheme(ISSUER_URI.to_string())),
        te.verify_buffer(&leaf_template().build()).await
    );
}

#[tokio::test]
async fn pem_issuer_is_accepted() {
    let fetcher = three_tier(false);
    fetcher.add_resource(ISSUER_URI, to_pem("CERTIFICATE", &issuing_cert()).as_bytes());
    let te = environment(VerifierSettings::default(), &fetcher);
    let leaf = to_pem("CERTIFICATE", &leaf_template().build());
    let chain = te.register_buffer(leaf.as_bytes()).await.unwrap();
    assert_eq!(3, chain.len());
    assert_eq!(
        VerificationResult::Trusted,
        te.verify_buffer(leaf.as_bytes()).await
    );
}

#[tokio::test]
async fn non_http_issuer_link_ends_chain() {
    let der = CertTemplate::new("Ldap", &[0x0b])
        .skid(&[0x21])
        .ca_issuer("ldap://ldap.test/cn=Issuing%20CA")
        .build();
    let te = TrustEnvironment::default();
    let chain = te.register_buffer(&der).await.unwrap();
    assert_eq!(1, chain.len());
}

#[tokio::test]
async fn self_referencing_issuer_ends_chain() {
    let self_ref_uri = "http://ca.test/self.crt";
    let root = CertTemplate::new("Self", &[0x0c])
        .skid(&[0x22])
        .ca_issuer(self_ref_uri)
        .build();
    let leaf = CertTemplate::new("Leaf", &[0x0d])
        .issuer("Self")
        .akid(&[0x22])
        .ca_issuer(self_ref_uri)
        .build();
    let fetcher = StaticFetcher::new();
    fetcher.add_resource(self_ref_uri, &root);
    let te = environment(VerifierSettings::default(), &fetcher);

    let chain = te.register_buffer(&leaf).await.unwrap();
    assert_eq!(2, chain.len());
    assert_eq!(1, fetcher.fetch_count(self_ref_uri));
}

#[tokio::test]
async fn issuer_cycle_ends_chain() {
    let a_uri = "http://ca.test/a.crt";
    let b_uri = "http://ca.test/b.crt";
    let a = CertTemplate::new("A", &[0x0e]).skid(&[0x31]).ca_issuer(b_uri).build();
    let b = CertTemplate::new("B", &[0x0f]).skid(&[0x32]).ca_issuer(a_uri).build();
    let fetcher = StaticFetcher::new();
    fetcher.add_resource(a_uri, &a);
    fetcher.add_resource(b_uri, &b);
    let te = environment(VerifierSettings::default(), &fetcher);

    // a -> b -> a (already present)
    let chain = te.register_buffer(&a).await.unwrap();
    assert_eq!(2, chain.len());
    assert_eq!("CN=B", chain.root().subject);
}

#[tokio::test]
async fn chain_too_long() {
    let fetcher = three_tier(false);
    let mut vs = VerifierSettings::default();
    vs.set_max_chain_depth(2);
    let te = environment(vs, &fetcher);
    assert_eq!(
        VerificationResult::Error(Error::ChainTooLong(2)),
        te.verify_buffer(&leaf_template().build()).await
    );

    let mut vs = VerifierSettings::default();
    vs.set_max_chain_depth(3);
    let te = environment(vs, &fetcher);
    assert_eq!(3, te.register_buffer(&leaf_template().build()).await.unwrap().len());
}

#[tokio::test]
async fn restored_registry() {
    let fetcher = three_tier(false);
    let te = environment(VerifierSettings::default(), &fetcher);
    te.register_buffer(&root_cert()).await.unwrap();
    let saved = te.registry().snapshot().await;

    let mut restored = TrustEnvironment::with_registry(
        VerifierSettings::default(),
        TrustRegistry::from_identifiers(saved),
    );
    restored.add_fetcher(Box::new(fetcher.clone()));
    assert_eq!(
        VerificationResult::Trusted,
        restored.verify_buffer(&leaf_template().build()).await
    );
}

#[tokio::test]
async fn concurrent_verify_and_register() {
    let fetcher = three_tier(false);
    let te = Arc::new(environment(VerifierSettings::default(), &fetcher));
    te.register_buffer(&root_cert()).await.unwrap();

    let mut handles = vec![];
    for i in 0..8u8 {
        let te = te.clone();
        handles.push(tokio::spawn(async move {
            let der = CertTemplate::new("Worker", &[0x40 + i]).skid(&[0x50 + i]).build();
            te.register_buffer(&der).await.unwrap();
            te.verify_buffer(&leaf_template().build()).await
        }));
    }
    for h in handles {
        assert_eq!(VerificationResult::Trusted, h.await.unwrap());
    }
    // root (0F) plus eight workers
    assert_eq!(9, te.registry().len().await);
}
