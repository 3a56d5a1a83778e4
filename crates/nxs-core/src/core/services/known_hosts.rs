/// Installation defaults of a beamline control host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownHost {
    pub host: &'static str,
    pub beamline: &'static str,
    pub masterhost: &'static str,
    pub user: &'static str,
    pub dbname: &'static str,
}

const fn entry(
    host: &'static str,
    beamline: &'static str,
    masterhost: &'static str,
    user: &'static str,
) -> KnownHost {
    KnownHost {
        host,
        beamline,
        masterhost,
        user,
        dbname: "nxsconfig",
    }
}

pub const KNOWN_HOSTS: &[KnownHost] = &[
    entry("hasble", "bl", "hasble", "blop"),
    entry("haso228k", "p00", "haso228k", "jkotan"),
    entry("haso111o", "p00", "haso111o", "tnunez"),
    entry("haso111tb", "p00", "haso111tb", "tnunez"),
    entry("haso107d1", "p09", "haso107d1", "p09user"),
    entry("hasp029rack", "p02", "hasp029rack", "p02user"),
    entry("haspp01eh1", "p01", "haspp01eh1", "p01user"),
    entry("haspp02ch1", "p02", "haspp02ch1", "p02user"),
    entry("haspp02ch2", "p02", "haspp02ch2", "p02user"),
    entry("haspp021ch1", "p021", "haspp021ch1", "p021user"),
    entry("haspp03", "p03", "haspp03", "p03user"),
    entry("haspp03nano", "p03nano", "haspp03nano", "p03nano"),
    entry("haspp04exp1", "p04", "haspp04exp1", "p04user"),
    entry("haspp04exp2", "p04", "haspp04exp2", "p04user"),
    entry("haspp06ctrl", "p06", "haspp06ctrl", "p06user"),
    entry("haspp06nc1", "p06", "haspp06nc1", "p06user"),
    entry("haspp08", "p08", "haspp08", "p08user"),
    entry("haspp09", "p09", "haspp09", "p09user"),
    entry("haspp09dif", "p09", "haspp09dif", "p09user"),
    entry("haspp09mag", "p09", "haspp09mag", "p09user"),
    entry("haspp10e1", "p10", "haspp10e1", "p10user"),
    entry("haspp10e2", "p10", "haspp10e2", "p10user"),
    entry("haspp11oh", "p11", "haspp11oh", "p11user"),
    entry("haspp11sardana", "p11", "haspp11sardana", "p11user"),
    entry("haspp21lab", "p21", "haspp21lab", "p21user"),
    entry("haspp22lh", "p22", "haspp22lh", "p22user"),
    entry("haspp23eh2", "p23", "haspp23eh2", "p23user"),
    entry("haspp64", "p64", "haspp64", "p64user"),
    entry("haspp65", "p65", "haspp65", "p65user"),
    entry("haspp66", "p66", "haspp66", "p66user"),
];

/// Entry of a host, matched on its short name.
pub fn lookup(host: &str) -> Option<&'static KnownHost> {
    let short = host.split('.').next().unwrap_or(host);
    KNOWN_HOSTS.iter().find(|known| known.host == short)
}
