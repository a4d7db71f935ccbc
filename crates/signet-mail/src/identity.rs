use rand::seq::SliceRandom;
use rand::Rng;

/// Default first-name pool for generated identities.
pub const DEFAULT_FIRST_NAMES: &[&str] = &[
    "John", "Alice", "David", "Sophia", "Liam", "Emma", "Noah", "Ava", "Ethan", "Mia", "Oliver",
    "Isabella", "James", "Charlotte", "Amelia", "Benjamin", "Harper", "Lucas", "Ella", "Henry",
];

/// Default last-name pool for generated identities.
pub const DEFAULT_LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Brown", "Williams", "Taylor", "Miller", "Wilson", "Davis", "Anderson",
    "Thomas", "Jackson", "White", "Harris", "Martin", "Garcia", "Clark", "Rodriguez", "Lewis",
    "Lee", "Walker",
];

const TAG_LEN: usize = 4;

/// Name pools and address parts used to build identities. Pure data, so a
/// deployment can swap the pools without touching flow code.
#[derive(Debug, Clone)]
pub struct NamePools {
    pub first: Vec<String>,
    pub last: Vec<String>,
    /// Appended to the random tag in the mailbox local-part.
    pub suffix: String,
    /// Domain of the disposable-inbox provider.
    pub domain: String,
}

impl Default for NamePools {
    fn default() -> Self {
        Self {
            first: DEFAULT_FIRST_NAMES.iter().map(|s| s.to_string()).collect(),
            last: DEFAULT_LAST_NAMES.iter().map(|s| s.to_string()).collect(),
            suffix: "test".into(),
            domain: "mailsac.com".into(),
        }
    }
}

/// A generated per-run identity: the name that goes into the sign-up form
/// and the mailbox the verification email lands in.
///
/// The mailbox local-part is `{first}.{last}.{tag}{suffix}` with a random
/// four-letter tag; there is no collision check, the tag's entropy is what
/// keeps reuse unlikely within a test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    /// Mailbox local-part, e.g. `john.smith.abcdtest`.
    pub mailbox: String,
    /// Full address, e.g. `john.smith.abcdtest@mailsac.com`.
    pub email: String,
}

impl Identity {
    /// Sample a fresh identity from `pools`.
    pub fn generate(pools: &NamePools, rng: &mut impl Rng) -> Self {
        let first_name = pick(&pools.first, rng, "alex").to_string();
        let last_name = pick(&pools.last, rng, "doe").to_string();

        let tag: String = (0..TAG_LEN)
            .map(|_| rng.gen_range(b'a'..=b'z') as char)
            .collect();

        let mailbox = format!(
            "{}.{}.{}{}",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            tag,
            pools.suffix
        );
        let email = format!("{mailbox}@{}", pools.domain);

        Self {
            first_name,
            last_name,
            mailbox,
            email,
        }
    }
}

fn pick<'a>(pool: &'a [String], rng: &mut impl Rng, fallback: &'a str) -> &'a str {
    pool.choose(rng).map(String::as_str).unwrap_or(fallback)
}
