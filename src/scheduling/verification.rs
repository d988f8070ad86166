use rand::{distributions::Alphanumeric, Rng};

/// Length of the opaque verification token; at 32 alphanumeric characters
/// collisions are negligible and the store's unique index is the backstop.
pub const TOKEN_LENGTH: usize = 32;

/// Mint the opaque verification token handed to the client at booking time.
/// `thread_rng` is a CSPRNG, so tokens are not guessable.
pub fn mint_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Mint a 4-digit PIN, uniform over 1000..=9999. Uniqueness among active
/// appointments is the lifecycle's job: it re-mints on collision.
pub fn mint_pin() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}
