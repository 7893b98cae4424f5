/// Application name
pub const APP_NAME: &str = "sealpost";

/// RSA modulus size for client keypairs, in bits
pub const RSA_KEY_BITS: usize = 2048;

/// PKCS#1 v1.5 padding overhead in bytes
pub const PKCS1_V15_OVERHEAD: usize = 11;

/// Random bytes behind every message ID
pub const MESSAGE_ID_SIZE: usize = 64;

/// PEM label of the private key block in the key file (PKCS#1 DER)
pub const PEM_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// PEM label of the public key block in the key file (PKCS#1 DER)
pub const PEM_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

/// JWK key type discriminator for RSA keys
pub const JWK_KTY_RSA: &str = "RSA";

/// JWK algorithm advertised for message encryption keys
pub const JWK_ALG_RSA1_5: &str = "RSA1_5";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Query parameter naming the user on lookups
pub const USER_ID_PARAM: &str = "userID";

/// HTTP paths
pub const PUBKEY_PATH: &str = "/pubkey";
pub const MESSAGES_PATH: &str = "/messages";
