use serde::Serialize;
use sha2::Digest;

#[cfg(test)]
#[path = "./hash.test.rs"]
mod tests;

/// SHA-256 digest of a sequence of values, each one fed to the hasher as a
/// newline-terminated JSON document. Keys built this way stay stable across
/// releases as long as the serialized shape of the values doesn't change.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha256 {
    state: Vec<u8>,
}

impl Sha256 {
    pub fn from_data<T: AsRef<[u8]>>(data: T) -> Self {
        let mut hasher = sha2::Sha256::new();
        hasher.update(data.as_ref());

        Sha256 {state: hasher.finalize().to_vec()}
    }

    pub fn from_values<T: Serialize>(values: &[T]) -> Self {
        let mut hasher = sha2::Sha256::new();

        for value in values {
            // Serializing plain data into a Vec can't fail
            let mut encoded
                = serde_json::to_vec(value).unwrap_or_default();

            encoded.push(b'\n');
            hasher.update(&encoded);
        }

        Sha256 {state: hasher.finalize().to_vec()}
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.state)
    }
}

impl std::fmt::Display for Sha256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
