// (c) 2025 Ross Younger

//! Session protocol definitions: command registries, status registry, and
//! payload codecs
//!
//! Protocol flow, per command:
//! * C ➡️ S : [`RequestHeader`](super::frame::RequestHeader), then an
//!   obfuscated payload laid out per [`Request`].
//! * S ➡️ C : [`ResponseHeader`](super::frame::ResponseHeader) carrying the
//!   paired response code and one [`Status`], then any declared payload.
//! * Upload and Download additionally stream file bytes out-of-band via the
//!   chunked transfer primitive, gated on [`Status::StartUpload`] or an
//!   8-byte length payload respectively.
//!
//! Integer fields are unsigned little-endian. String fields are
//! length-prefixed with 4-byte counts; file lengths use an 8-byte field.
//! Fields are packed left to right with no padding.

use thiserror::Error;

/// Errors arising from payload decode
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum PayloadError {
    /// The request code is not in the registry
    #[error("request code {0} is not recognised")]
    UnknownCode(u32),
    /// The payload ended before the field did
    #[error("truncated payload: needed {needed} more bytes for {field}")]
    Truncated {
        /// Which field ran short
        field: &'static str,
        /// How many bytes were missing
        needed: usize,
    },
    /// A string field did not decode
    #[error("{field} is not valid UTF-8")]
    NotUtf8 {
        /// Which field failed to decode
        field: &'static str,
    },
}

/// Numeric request codes: a closed registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::FromRepr)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum RequestCode {
    Register = 1000,
    Login = 1001,
    Quit = 1002,
    RemoveFile = 1003,
    DownloadFile = 1004,
    UploadFile = 1005,
    ListFiles = 1006,
    CreateDirectory = 1007,
}

impl RequestCode {
    /// The response code a well-behaved server answers this request with
    #[must_use]
    pub fn response(self) -> ResponseCode {
        match self {
            RequestCode::Register => ResponseCode::Register,
            RequestCode::Login => ResponseCode::Login,
            RequestCode::Quit => ResponseCode::Quit,
            RequestCode::RemoveFile => ResponseCode::RemoveFile,
            RequestCode::DownloadFile => ResponseCode::DownloadFile,
            RequestCode::UploadFile => ResponseCode::UploadFile,
            RequestCode::ListFiles => ResponseCode::ListFiles,
            RequestCode::CreateDirectory => ResponseCode::CreateDirectory,
        }
    }
}

/// Numeric response codes. Deliberately distinct from [`RequestCode`] so a
/// client can verify that a response answers the request it just sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::FromRepr)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum ResponseCode {
    Register = 2000,
    Login = 2001,
    Quit = 2002,
    RemoveFile = 2003,
    DownloadFile = 2004,
    UploadFile = 2005,
    ListFiles = 2006,
    CreateDirectory = 2007,
}

/// Machine-readable outcome carried in every response header.
///
/// `StartUpload` is not a terminal outcome: it tells the uploader the
/// server has accepted the offer and the streaming phase may begin.
/// [`Status::is_terminal`] distinguishes it from the rest of the registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, strum::Display, strum::FromRepr,
)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum Status {
    Ok = 0,
    UserNotFound = 1,
    NotLoggedIn = 2,
    UserAlreadyExists = 3,
    FileAlreadyExists = 4,
    FileNotFound = 5,
    IncorrectPassword = 6,
    StartUpload = 7,
    DirectoryAlreadyExists = 8,
    IsADirectory = 9,
    DirectoryNotFound = 10,
}

impl Status {
    /// Is this a final outcome for the request, as opposed to a
    /// continuation signal?
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::StartUpload)
    }
}

/// Separator between entries in a [`ListFiles`](RequestCode::ListFiles)
/// listing payload
pub const LISTING_SEPARATOR: &str = " , ";

/////////////////////////////////////////////////////////////////////////////////////////////
// PAYLOAD CODECS

/// Cursor for unpacking fixed-layout payload fields left to right
struct Fields<'a> {
    buf: &'a [u8],
}

impl<'a> Fields<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], PayloadError> {
        if self.buf.len() < n {
            return Err(PayloadError::Truncated {
                field,
                needed: n - self.buf.len(),
            });
        }
        let (head, rest) = self.buf.split_at(n);
        self.buf = rest;
        Ok(head)
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, PayloadError> {
        Ok(u32::from_le_bytes(self.take(4, field)?.try_into().unwrap()))
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, PayloadError> {
        Ok(u64::from_le_bytes(self.take(8, field)?.try_into().unwrap()))
    }

    fn utf8(bytes: &[u8], field: &'static str) -> Result<String, PayloadError> {
        String::from_utf8(bytes.to_vec()).map_err(|_| PayloadError::NotUtf8 { field })
    }

    /// A 4-byte count followed by that many bytes of text
    fn string(&mut self, field: &'static str) -> Result<String, PayloadError> {
        let len = self.u32(field)? as usize;
        Self::utf8(self.take(len, field)?, field)
    }
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

#[allow(clippy::cast_possible_truncation)]
fn push_string(out: &mut Vec<u8>, value: &str) {
    push_u32(out, value.len() as u32);
    out.extend_from_slice(value.as_bytes());
}

/// Username and password, as carried by Register and Login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Payload bytes, pre-obfuscation
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_string(&mut out, &self.username);
        push_string(&mut out, &self.password);
        out
    }

    /// Unpacks a credentials payload.
    pub fn decode(payload: &[u8]) -> Result<Self, PayloadError> {
        let mut fields = Fields::new(payload);
        Ok(Self {
            username: fields.string("username")?,
            password: fields.string("password")?,
        })
    }
}

/// Arguments for the upload command.
///
/// Both length counts precede both strings; this is the one payload whose
/// counts are not immediately adjacent to their bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadArgs {
    /// Size of the file content that will follow out-of-band
    pub file_len: u64,
    /// Destination file name
    pub file_name: String,
    /// Destination directory, relative to the user's root ("" for the root)
    pub dir_name: String,
}

impl UploadArgs {
    /// Payload bytes, pre-obfuscation
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_u64(&mut out, self.file_len);
        push_u32(&mut out, self.file_name.len() as u32);
        push_u32(&mut out, self.dir_name.len() as u32);
        out.extend_from_slice(self.file_name.as_bytes());
        out.extend_from_slice(self.dir_name.as_bytes());
        out
    }

    /// Unpacks an upload payload.
    pub fn decode(payload: &[u8]) -> Result<Self, PayloadError> {
        let mut fields = Fields::new(payload);
        let file_len = fields.u64("file length")?;
        let name_len = fields.u32("file name length")? as usize;
        let dir_len = fields.u32("directory name length")? as usize;
        let file_name = Fields::utf8(fields.take(name_len, "file name")?, "file name")?;
        let dir_name = Fields::utf8(fields.take(dir_len, "directory name")?, "directory name")?;
        Ok(Self {
            file_len,
            file_name,
            dir_name,
        })
    }
}

/// Packs the single-name payload used by Download, Remove and
/// `CreateDirectory`.
#[must_use]
pub fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    push_string(&mut out, name);
    out
}

/// Unpacks a single-name payload.
pub fn decode_name(payload: &[u8]) -> Result<String, PayloadError> {
    Fields::new(payload).string("name")
}

/// Packs the Download success payload: the length of the content about to
/// be streamed.
#[must_use]
pub fn encode_file_len(len: u64) -> Vec<u8> {
    let mut out = Vec::new();
    push_u64(&mut out, len);
    out
}

/// Unpacks a Download success payload.
pub fn decode_file_len(payload: &[u8]) -> Result<u64, PayloadError> {
    Fields::new(payload).u64("file length")
}

/// Packs a `ListFiles` success payload.
#[must_use]
pub fn encode_listing(listing: &str) -> Vec<u8> {
    let mut out = Vec::new();
    push_string(&mut out, listing);
    out
}

/// Unpacks a `ListFiles` success payload.
pub fn decode_listing(payload: &[u8]) -> Result<String, PayloadError> {
    Fields::new(payload).string("listing")
}

/// A decoded client request: the closed dispatch set.
///
/// Pairing the numeric code with its payload layout in one place makes
/// server dispatch an exhaustive match; adding a command without handling
/// it everywhere is a compile error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Request {
    Register(Credentials),
    Login(Credentials),
    Quit,
    RemoveFile(String),
    DownloadFile(String),
    UploadFile(UploadArgs),
    ListFiles,
    CreateDirectory(String),
}

impl Request {
    /// The request code for this command kind
    #[must_use]
    pub fn code(&self) -> RequestCode {
        match self {
            Request::Register(_) => RequestCode::Register,
            Request::Login(_) => RequestCode::Login,
            Request::Quit => RequestCode::Quit,
            Request::RemoveFile(_) => RequestCode::RemoveFile,
            Request::DownloadFile(_) => RequestCode::DownloadFile,
            Request::UploadFile(_) => RequestCode::UploadFile,
            Request::ListFiles => RequestCode::ListFiles,
            Request::CreateDirectory(_) => RequestCode::CreateDirectory,
        }
    }

    /// Payload bytes for this request, pre-obfuscation
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Request::Register(creds) | Request::Login(creds) => creds.encode(),
            Request::Quit | Request::ListFiles => Vec::new(),
            Request::RemoveFile(name)
            | Request::DownloadFile(name)
            | Request::CreateDirectory(name) => encode_name(name),
            Request::UploadFile(args) => args.encode(),
        }
    }

    /// Pairs a wire code with its payload and unpacks the result.
    pub fn decode(code: u32, payload: &[u8]) -> Result<Self, PayloadError> {
        let code = RequestCode::from_repr(code).ok_or(PayloadError::UnknownCode(code))?;
        Ok(match code {
            RequestCode::Register => Request::Register(Credentials::decode(payload)?),
            RequestCode::Login => Request::Login(Credentials::decode(payload)?),
            RequestCode::Quit => Request::Quit,
            RequestCode::RemoveFile => Request::RemoveFile(decode_name(payload)?),
            RequestCode::DownloadFile => Request::DownloadFile(decode_name(payload)?),
            RequestCode::UploadFile => Request::UploadFile(UploadArgs::decode(payload)?),
            RequestCode::ListFiles => Request::ListFiles,
            RequestCode::CreateDirectory => Request::CreateDirectory(decode_name(payload)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        decode_file_len, decode_listing, encode_file_len, encode_listing, Credentials,
        PayloadError, Request, RequestCode, ResponseCode, Status, UploadArgs,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn registry_values_are_fixed() {
        // These numbers are the wire protocol; they must never drift.
        assert_eq!(RequestCode::Register as u32, 1000);
        assert_eq!(RequestCode::CreateDirectory as u32, 1007);
        assert_eq!(ResponseCode::Register as u32, 2000);
        assert_eq!(ResponseCode::CreateDirectory as u32, 2007);
        assert_eq!(Status::Ok as u32, 0);
        assert_eq!(Status::StartUpload as u32, 7);
        assert_eq!(Status::DirectoryNotFound as u32, 10);
    }

    #[test]
    fn request_response_pairing() {
        for (request, response) in [
            (RequestCode::Register, ResponseCode::Register),
            (RequestCode::Login, ResponseCode::Login),
            (RequestCode::Quit, ResponseCode::Quit),
            (RequestCode::RemoveFile, ResponseCode::RemoveFile),
            (RequestCode::DownloadFile, ResponseCode::DownloadFile),
            (RequestCode::UploadFile, ResponseCode::UploadFile),
            (RequestCode::ListFiles, ResponseCode::ListFiles),
            (RequestCode::CreateDirectory, ResponseCode::CreateDirectory),
        ] {
            assert_eq!(request.response(), response);
            // responses occupy a distinct numeric range
            assert_ne!(request as u32, response as u32);
        }
    }

    #[test]
    fn only_start_upload_is_non_terminal() {
        for code in 0..=10u32 {
            let status = Status::from_repr(code).unwrap();
            assert_eq!(status.is_terminal(), status != Status::StartUpload);
        }
        assert!(Status::from_repr(11).is_none());
    }

    #[test]
    fn credentials_wire_layout() {
        let creds = Credentials {
            username: "user".to_string(),
            password: "pw".to_string(),
        };
        assert_eq!(
            creds.encode(),
            [
                4, 0, 0, 0, b'u', b's', b'e', b'r', //
                2, 0, 0, 0, b'p', b'w',
            ]
        );
        assert_eq!(Credentials::decode(&creds.encode()), Ok(creds));
    }

    #[test]
    fn upload_wire_layout() {
        let args = UploadArgs {
            file_len: 0x0102_0304_0506_0708,
            file_name: "f".to_string(),
            dir_name: "dir".to_string(),
        };
        assert_eq!(
            args.encode(),
            [
                8, 7, 6, 5, 4, 3, 2, 1, // file length
                1, 0, 0, 0, // name length
                3, 0, 0, 0, // directory length
                b'f', b'd', b'i', b'r',
            ]
        );
        assert_eq!(UploadArgs::decode(&args.encode()), Ok(args));
    }

    #[test]
    fn file_len_roundtrip() {
        let payload = encode_file_len(u64::MAX - 1);
        assert_eq!(payload.len(), 8);
        assert_eq!(decode_file_len(&payload), Ok(u64::MAX - 1));
    }

    #[test]
    fn listing_roundtrip() {
        let listing = "a , b/c , d";
        assert_eq!(decode_listing(&encode_listing(listing)).unwrap(), listing);
        assert_eq!(decode_listing(&encode_listing("")).unwrap(), "");
    }

    #[test]
    fn request_roundtrip_all_kinds() {
        let creds = Credentials {
            username: "someuser".to_string(),
            password: "secret1A".to_string(),
        };
        for request in [
            Request::Register(creds.clone()),
            Request::Login(creds),
            Request::Quit,
            Request::RemoveFile("a/b".to_string()),
            Request::DownloadFile("x.bin".to_string()),
            Request::UploadFile(UploadArgs {
                file_len: 12345,
                file_name: "x.bin".to_string(),
                dir_name: String::new(),
            }),
            Request::ListFiles,
            Request::CreateDirectory("docs".to_string()),
        ] {
            let decoded =
                Request::decode(request.code() as u32, &request.encode_payload()).unwrap();
            assert_eq!(decoded, request);
        }
    }

    #[test]
    fn unknown_code_rejected() {
        assert_eq!(
            Request::decode(4242, &[]),
            Err(PayloadError::UnknownCode(4242))
        );
        // response codes are not request codes
        assert_eq!(
            Request::decode(2000, &[]),
            Err(PayloadError::UnknownCode(2000))
        );
    }

    #[test]
    fn truncated_payload_rejected() {
        // count says 100 bytes of username, payload holds 2
        let payload = [100, 0, 0, 0, b'a', b'b'];
        let err = Request::decode(RequestCode::Login as u32, &payload).unwrap_err();
        assert_eq!(
            err,
            PayloadError::Truncated {
                field: "username",
                needed: 98
            }
        );
    }

    #[test]
    fn invalid_utf8_rejected() {
        let payload = [2, 0, 0, 0, 0xFF, 0xFE];
        let err = super::decode_name(&payload).unwrap_err();
        assert_eq!(err, PayloadError::NotUtf8 { field: "name" });
    }
}
