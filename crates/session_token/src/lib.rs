mod token;

pub use token::{
    Error, SessionTokenClaims, SessionTokenHeader, TOKEN_VERSION, sign_hs256, verify_hs256,
};
