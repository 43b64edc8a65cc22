// JSON-lines request replay
//
// Each stdin line is one operation request:
//
//   {"kind":"bind","target_dn":"cn=X,dc=bogus,dc=com","credentials":"secret"}
//   {"kind":"bind","method":"sasl","mechanism":"EXTERNAL"}
//   {"kind":"search","target_dn":"o=nowhere","msg_id":7}
//
// and produces one stdout line describing what the default backend did:
//
//   {"msg_id":1,"kind":"bind","outcome":"bind_failed","results":[...],"result_text":"..."}
//
// Malformed lines produce {"line":N,"error":"..."} and do not stop the replay.

use defbackend_core::delivery::MemoryResultSender;
use defbackend_core::{BindMethod, DispatchTable, LdapResult, Operation, OperationKind, Outcome};
use serde::{Deserialize, Serialize};

/// Connection id used for replayed operations
pub const REPLAY_CONN_ID: u64 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RequestMethod {
    #[default]
    Simple,
    Sasl,
}

/// One operation request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    kind: OperationKind,
    #[serde(default)]
    msg_id: Option<i32>,
    #[serde(default)]
    target_dn: Option<String>,
    #[serde(default)]
    method: RequestMethod,
    #[serde(default)]
    mechanism: Option<String>,
    #[serde(default)]
    credentials: String,
}

impl Request {
    fn into_operation(self, default_msg_id: i32) -> Operation {
        let msg_id = self.msg_id.unwrap_or(default_msg_id);
        let op = match self.kind {
            OperationKind::Bind => {
                let method = match self.method {
                    RequestMethod::Simple => BindMethod::Simple,
                    RequestMethod::Sasl => BindMethod::Sasl {
                        mechanism: self.mechanism.unwrap_or_default(),
                    },
                };
                Operation::bind(self.target_dn, method, self.credentials.into_bytes())
            }
            kind => match self.target_dn {
                Some(dn) => Operation::new(kind).with_target_dn(dn),
                None => Operation::new(kind),
            },
        };
        op.with_ids(REPLAY_CONN_ID, msg_id)
    }
}

/// What the default backend did with one request
#[derive(Debug, Serialize)]
pub struct Response {
    pub msg_id: i32,
    pub kind: OperationKind,
    pub outcome: Outcome,
    pub results: Vec<LdapResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,
}

/// A line that could not be processed
#[derive(Debug, Serialize)]
pub struct LineError {
    pub line: usize,
    pub error: String,
}

/// Message id for a request without one: its line number, saturating at
/// `i32::MAX`
fn default_msg_id(line_no: usize) -> i32 {
    i32::try_from(line_no).unwrap_or(i32::MAX)
}

/// Process one input line; `line_no` is 1-based
///
/// Returns the JSON text to print, or `None` for blank lines.
pub fn process_line(
    table: &DispatchTable,
    results: &MemoryResultSender,
    line_no: usize,
    line: &str,
) -> anyhow::Result<Option<String>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let response = serde_json::from_str::<Request>(line)
        .map_err(anyhow::Error::from)
        .and_then(|request| {
            let mut op = request.into_operation(default_msg_id(line_no));
            let outcome = table.dispatch(&mut op)?;
            Ok(Response {
                msg_id: op.msg_id(),
                kind: op.kind(),
                outcome,
                results: results.take().into_iter().map(|sent| sent.result).collect(),
                result_text: op.result_text().map(str::to_string),
            })
        });

    let text = match response {
        Ok(response) => serde_json::to_string(&response)?,
        Err(e) => serde_json::to_string(&LineError {
            line: line_no,
            error: e.to_string(),
        })?,
    };
    Ok(Some(text))
}
