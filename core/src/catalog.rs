use mscheck_protocols::dcerpc::SyntaxId;
use uuid::uuid;

/// A well-known named pipe and the RPC interface served behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeDescriptor {
    pub name: &'static str,
    pub interface: SyntaxId,
}

impl PipeDescriptor {
    pub const fn new(name: &'static str, interface: SyntaxId) -> Self {
        Self { name, interface }
    }

    /// Path of the pipe relative to the IPC$ tree.
    pub fn path(&self) -> String {
        format!("\\{}", self.name)
    }
}

/// Probed in this order.
pub static PIPES: &[PipeDescriptor] = &[
    PipeDescriptor::new(
        "browser",
        SyntaxId::new(uuid!("6bffd098-a112-3610-9833-012892020162"), 0, 0),
    ),
    PipeDescriptor::new(
        "spoolss",
        SyntaxId::new(uuid!("12345678-1234-abcd-ef00-0123456789ab"), 1, 0),
    ),
    PipeDescriptor::new(
        "netlogon",
        SyntaxId::new(uuid!("12345678-1234-abcd-ef00-01234567cffb"), 1, 0),
    ),
    PipeDescriptor::new(
        "lsarpc",
        SyntaxId::new(uuid!("12345778-1234-abcd-ef00-0123456789ab"), 0, 0),
    ),
    PipeDescriptor::new(
        "samr",
        SyntaxId::new(uuid!("12345778-1234-abcd-ef00-0123456789ac"), 1, 0),
    ),
];
