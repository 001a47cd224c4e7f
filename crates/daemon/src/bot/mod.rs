//! Chat front end: text commands in, reply text out.
//!
//! The chat user id is the tenant; stores are found by owner prefix, so the
//! bot needs no registry entry and no admin secret.

pub mod telegram;

use common::prelude::{Credential, ErrorKind, KvError, KvService, OwnerProvisioner};

pub const NO_STORE_REPLY: &str = "You don't have a KV store. Use /create_kv to create one.";
pub const VIEW_USAGE_REPLY: &str = "Please specify the bucket name using `/view_bucket BUCKET_NAME`";

const HELP_REPLY: &str = "Commands:\n\
/create_kv - create your KV store and get an API key\n\
/change_api_key - replace your API key, keeping your data\n\
/list_buckets - list your buckets\n\
/view_bucket_keys BUCKET - list the keys in a bucket";

/// A recognised bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    CreateKv,
    ChangeApiKey,
    ListBuckets,
    ViewBucketKeys(Option<String>),
}

impl Command {
    /// Parse `/name[@bot] [args..]`; anything else is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        let head = words.next()?.strip_prefix('/')?;
        let name = head.split('@').next().unwrap_or(head);

        let command = match name {
            "start" | "help" => Command::Help,
            "create_kv" => Command::CreateKv,
            "change_api_key" => Command::ChangeApiKey,
            "list_buckets" => Command::ListBuckets,
            "view_bucket_keys" | "view_bucket" => {
                Command::ViewBucketKeys(words.next().map(str::to_string))
            }
            _ => return None,
        };
        Some(command)
    }
}

/// Handle one message from `owner`, returning the reply to send, if any.
pub fn handle_message<S>(svc: &S, owner: i64, text: &str) -> Option<String>
where
    S: KvService + OwnerProvisioner,
{
    let command = Command::parse(text)?;
    tracing::debug!(owner, ?command, "bot command");
    Some(execute(svc, owner, command))
}

pub fn execute<S>(svc: &S, owner: i64, command: Command) -> String
where
    S: KvService + OwnerProvisioner,
{
    match command {
        Command::Help => HELP_REPLY.to_string(),
        Command::CreateKv => match svc.create_owned(owner) {
            Ok(credential) => format!("Your API key is: {}", credential),
            Err(KvError::Conflict(_)) => "A KV already exists. Use /change_api_key".to_string(),
            Err(e) => error_reply(owner, e),
        },
        Command::ChangeApiKey => match svc.rotate_owned(owner) {
            Ok(credential) => format!("Your new API key is: {}", credential),
            Err(KvError::TenantNotFound(_)) => "KV does not exist. Use /create_kv".to_string(),
            Err(e) => error_reply(owner, e),
        },
        Command::ListBuckets => with_credential(svc, owner, |credential| {
            let buckets = svc.list_buckets(credential)?;
            if buckets.is_empty() {
                return Ok("You have no buckets.".to_string());
            }
            let mut reply = String::from("Your buckets:\n");
            for bucket in buckets {
                reply.push_str(&format!("- {}\n", bucket));
            }
            Ok(reply)
        }),
        Command::ViewBucketKeys(None) => VIEW_USAGE_REPLY.to_string(),
        Command::ViewBucketKeys(Some(bucket)) => with_credential(svc, owner, |credential| {
            let keys = svc.list_keys(credential, &bucket)?;
            if keys.is_empty() {
                return Ok(format!("Bucket '{}' is empty.", bucket));
            }
            Ok(keys.iter().map(|k| format!("{}\n", k)).collect())
        }),
    }
}

fn with_credential<S>(
    svc: &S,
    owner: i64,
    op: impl FnOnce(&Credential) -> Result<String, KvError>,
) -> String
where
    S: OwnerProvisioner,
{
    let credential = match svc.owned_credential(owner) {
        Ok(credential) => credential,
        Err(KvError::TenantNotFound(_)) => return NO_STORE_REPLY.to_string(),
        Err(e) => return error_reply(owner, e),
    };
    op(&credential).unwrap_or_else(|e| error_reply(owner, e))
}

fn error_reply(owner: i64, err: KvError) -> String {
    if err.kind() == ErrorKind::Internal {
        tracing::error!(owner, error = %err, "bot command failed");
        return format!("Error: {}", ErrorKind::Internal);
    }
    format!("Error: {}", err)
}
