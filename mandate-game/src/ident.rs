//! Reversible friendly run codes and turn identifiers.
//! Code format: <ROLE>-<WORD><NN>, e.g., AT-AGORA42, MC-AIRLOCK07

use crate::state::Role;

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// Word list for run codes
pub const WORD_LIST: [&str; 64] = [
    "AGORA", "SENATE", "FORUM", "ARCHON", "TRIREME", "OLIVE", "ORACLE", "STOA", "DRACHMA",
    "ASSEMBLY", "HARBOR", "PHALANX", "CONGRESS", "BELTWAY", "PRAIRIE", "TURBINE", "INTERSTATE",
    "CAPITOL", "LEVEE", "GRIDLOCK", "BALLOT", "FRONTIER", "RUSTBELT", "SUBURB", "AIRLOCK",
    "REGOLITH", "HABITAT", "CANYON", "REACTOR", "GREENHOUSE", "CONVOY", "ORBITER", "DUSTSTORM",
    "COLONY", "TREASURY", "CABINET", "CHARTER", "CENSUS", "CURFEW", "EMBARGO", "ENVOY",
    "MANDATE", "QUORUM", "RATION", "RECALL", "REFORM", "SUMMIT", "TRIBUNE", "VETO", "WARD",
    "ACCORD", "BRIEFING", "CRISIS", "DECREE", "DOSSIER", "EDICT", "LEDGER", "MOTION", "PETITION",
    "PROTOCOL", "REGENT", "SESSION", "STATUTE", "TICKER",
];

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & 0x01FF, ((packed >> 9) & 0x7F) as u8)
}

fn compose_entropy(role: Role, word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    // Domain-separated FNV input
    let mut buf = [0u8; 10];
    buf[..6].copy_from_slice(b"MNDTE-");
    buf[6] = role.code_prefix().as_bytes()[0];
    buf[7] = (packed & 0xFF) as u8;
    buf[8] = (packed >> 8) as u8;
    buf[9] = 0xA5;
    let h = fnv1a64(&buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render the friendly code for an already-composed entropy value.
#[must_use]
pub fn encode_run_code(role: Role, entropy: u64) -> String {
    let packed = (entropy & 0xFFFF) as u16;
    let (wi, mut nn) = unpack(packed);
    let word = WORD_LIST.get(wi as usize).copied().unwrap_or("AGORA");
    if nn > 99 {
        nn %= 100;
    }
    format!("{}-{word}{nn:02}", role.code_prefix())
}

/// Decode a run code back to its role and entropy value.
#[must_use]
pub fn decode_run_code(code: &str) -> Option<(Role, u64)> {
    let s = code.trim();
    let (prefix, rest) = s.split_once('-')?;
    let role = match prefix.to_ascii_uppercase().as_str() {
        "AT" => Role::Athens,
        "NA" => Role::NorthAmerica,
        "MC" => Role::MarsColony,
        _ => return None,
    };
    if rest.len() < 3 {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    let entropy = compose_entropy(role, wi, nn);
    Some((role, entropy))
}

/// Compose a fresh run code from raw entropy (e.g., a platform RNG draw).
#[must_use]
pub fn generate_run_code(role: Role, entropy: u64) -> String {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = ((entropy >> 17) % 100) as u8;
    let composed = compose_entropy(role, wi, nn);
    encode_run_code(role, composed)
}

/// Identifier of one turn within a run; the cache staleness guard compares
/// these.
#[must_use]
pub fn turn_identifier(run_code: &str, day: u32) -> String {
    format!("{run_code}:{day}")
}
