#![no_main]

use libfuzzer_sys::fuzz_target;
use x509_tbs::cert::Cert;
use x509_tbs::crl::Crl;
use x509_tbs::ext::Extensions;
use x509_tbs::name::DistinguishedName;
use x509_tbs::registry::standard_registry;

fuzz_target!(|data: &[u8]| {
    let (which, data) = match data.split_first() {
        Some((first, data)) => (*first, data),
        None => return,
    };

    match which % 5 {
        0 => { let _ = Cert::decode(data); },
        1 => { let _ = Crl::decode(data); },
        2 => { let _ = DistinguishedName::decode(data); },
        3 => { let _ = Extensions::decode(data, standard_registry()); },
        4 => {
            if let Ok(s) = std::str::from_utf8(data) {
                let _ = s.parse::<DistinguishedName>();
            }
        }
        _ => panic!("what?"),
    }
});
