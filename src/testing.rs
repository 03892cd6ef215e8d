//! In-process fake array for unit tests
//!
//! Implements [`Transport`] over a small in-memory model of volumes, hosts,
//! host clusters and LUNs. Every request is recorded; individual endpoints can
//! be overridden with canned replies or transport failures.

use crate::client::Client;
use crate::domain::ports::{ApiRequest, Method, RawResponse, Transport, TransportError};
use crate::resources::Lun;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BASE_URL: &str = "https://array.test/";

#[derive(Debug, Clone)]
enum Reply {
    Status(u16, String),
    TransportFailure,
}

#[derive(Debug)]
struct Canned {
    method: Method,
    path: String,
    reply: Reply,
}

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, BTreeMap<i64, Value>>,
    luns: Vec<Lun>,
    next_id: i64,
    requests: Vec<ApiRequest>,
    canned: Vec<Canned>,
    in_flight: usize,
    max_in_flight: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeArray {
    state: Arc<Mutex<State>>,
}

impl FakeArray {
    pub fn new() -> Self {
        let array = Self::default();
        array.state().next_id = 1000;
        array
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Unscoped client talking to this array
    pub fn client(&self) -> Client {
        Client::new(Arc::new(self.clone()))
    }

    pub fn add_record(&self, collection: &str, record: Value) {
        let id = record["id"].as_i64().unwrap();
        self.state()
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, record);
    }

    pub fn add_volume(&self, id: i64, name: &str, pool_id: i64) {
        self.add_record(
            "volumes",
            json!({
                "id": id, "name": name, "pool_id": pool_id, "size": 1u64 << 30,
                "provtype": "THIN", "type": "MASTER", "depth": 0,
            }),
        );
    }

    pub fn add_host(&self, id: i64, name: &str) {
        self.add_record("hosts", json!({"id": id, "name": name, "host_type": "esxi"}));
    }

    pub fn add_cluster(&self, id: i64, name: &str) {
        self.add_record("clusters", json!({"id": id, "name": name, "host_type": "esxi"}));
    }

    pub fn add_lun(&self, mut lun: Lun) {
        let mut state = self.state();
        if lun.id == 0 {
            state.next_id += 1;
            lun.id = state.next_id;
        }
        state.luns.push(lun);
    }

    pub fn add_host_lun(&self, host_id: i64, volume_id: i64, lun: i64) {
        self.add_lun(Lun {
            lun,
            host_id,
            volume_id,
            ..Default::default()
        });
    }

    pub fn add_cluster_lun(&self, cluster_id: i64, volume_id: i64, lun: i64) {
        self.add_lun(Lun {
            lun,
            clustered: true,
            host_cluster_id: cluster_id,
            volume_id,
            ..Default::default()
        });
    }

    /// Answer `method path` with a fixed status and body
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.state().canned.push(Canned {
            method,
            path: path.to_string(),
            reply: Reply::Status(status, body.to_string()),
        });
    }

    /// Fail `method path` at the connection level
    pub fn fail_transport(&self, method: Method, path: &str) {
        self.state().canned.push(Canned {
            method,
            path: path.to_string(),
            reply: Reply::TransportFailure,
        });
    }

    pub fn clear_responses(&self) {
        self.state().canned.clear();
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state().requests.clone()
    }

    /// Paths of every DELETE request, in order
    pub fn deletes(&self) -> Vec<String> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == Method::Delete)
            .map(|r| r.path.clone())
            .collect()
    }

    pub fn has_volume(&self, id: i64) -> bool {
        self.state()
            .collections
            .get("volumes")
            .map_or(false, |v| v.contains_key(&id))
    }

    pub fn volume_mapped(&self, id: i64) -> bool {
        self.state().luns.iter().any(|l| l.volume_id == id)
    }

    pub fn max_in_flight(&self) -> usize {
        self.state().max_in_flight
    }
}

#[async_trait]
impl Transport for FakeArray {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let url = format!("{}{}", BASE_URL, request.path);
        {
            let mut state = self.state();
            state.requests.push(request.clone());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }

        // Give concurrent callers a chance to interleave
        tokio::time::sleep(Duration::from_millis(1)).await;

        let reply = {
            let mut state = self.state();
            state.in_flight -= 1;
            state.handle(&request)
        };

        match reply {
            Reply::Status(status, body) => Ok(RawResponse::new(url, status, body)),
            Reply::TransportFailure => Err(TransportError::Connection(format!(
                "connection refused: {}",
                url
            ))),
        }
    }
}

// =============================================================================
// Request Handling
// =============================================================================

fn ok(result: Value) -> Reply {
    let body = json!({"error": null, "metadata": {"ready": true}, "result": result});
    Reply::Status(200, body.to_string())
}

fn ok_collection(records: Vec<Value>) -> Reply {
    let body = json!({
        "error": null,
        "metadata": {
            "ready": true, "page": 1, "page_size": 50, "pages_total": 1,
            "number_of_objects": records.len(),
        },
        "result": records,
    });
    Reply::Status(200, body.to_string())
}

fn api_error(status: u16, code: &str, message: &str) -> Reply {
    let body = json!({
        "error": {"code": code, "message": message, "severity": "ERROR", "is_remote": false, "reasons": []},
        "metadata": null,
        "result": null,
    });
    Reply::Status(status, body.to_string())
}

fn parse_id(raw: &str) -> Result<i64, Reply> {
    raw.parse()
        .map_err(|_| api_error(400, "BAD_REQUEST", &format!("invalid id {}", raw)))
}

impl State {
    fn handle(&mut self, request: &ApiRequest) -> Reply {
        if let Some(canned) = self
            .canned
            .iter()
            .find(|c| c.method == request.method && c.path == request.path)
        {
            return canned.reply.clone();
        }

        let path = request.path.strip_prefix("api/rest/").unwrap_or(&request.path);
        let segments: Vec<&str> = path.split('/').collect();

        let result = match (request.method, segments.as_slice()) {
            (Method::Post, ["users", "login"]) => Ok(ok(Value::Null)),
            (Method::Get, [collection]) => Ok(self.query(collection, request)),
            (Method::Post, ["volumes"]) => Ok(self.create_volume(request.body.as_ref())),
            (Method::Get, ["initiators", address]) => Ok(self.initiator(address)),
            (Method::Get, [collection, id]) => parse_id(id).map(|id| self.get(collection, id)),
            (Method::Put, [collection, id]) => {
                parse_id(id).map(|id| self.update(collection, id, request.body.as_ref()))
            }
            (Method::Delete, ["volumes", id]) => parse_id(id).map(|id| self.delete_volume(id)),
            (Method::Get, ["volumes", id, "luns"]) => {
                parse_id(id).map(|id| self.luns_where(|l| l.volume_id == id))
            }
            (Method::Get, ["hosts", id, "luns"]) => {
                parse_id(id).map(|id| self.luns_where(|l| l.host_id == id))
            }
            (Method::Get, ["clusters", id, "hosts"]) => parse_id(id).map(|id| self.cluster_hosts(id)),
            (Method::Get, ["clusters", id, "luns"]) => {
                parse_id(id).map(|id| self.luns_where(|l| l.clustered && l.host_cluster_id == id))
            }
            (Method::Post, ["hosts", id, "luns"]) => {
                parse_id(id).map(|id| self.add_lun(false, id, request.body.as_ref()))
            }
            (Method::Post, ["clusters", id, "luns"]) => {
                parse_id(id).map(|id| self.add_lun(true, id, request.body.as_ref()))
            }
            (Method::Delete, ["hosts", id, "luns", "lun", n]) => parse_id(id)
                .and_then(|id| parse_id(n).map(|n| (id, n)))
                .map(|(id, n)| self.delete_lun(false, id, n)),
            (Method::Delete, ["clusters", id, "luns", "lun", n]) => parse_id(id)
                .and_then(|id| parse_id(n).map(|n| (id, n)))
                .map(|(id, n)| self.delete_lun(true, id, n)),
            _ => Ok(api_error(404, "NOT_FOUND", &format!("no route for {}", request.path))),
        };

        result.unwrap_or_else(|reply| reply)
    }

    fn view(&self, collection: &str, record: &Value) -> Value {
        let mut record = record.clone();
        if collection == "volumes" {
            let id = record["id"].as_i64().unwrap_or_default();
            record["mapped"] = json!(self.luns.iter().any(|l| l.volume_id == id));
        }
        record
    }

    fn query(&self, collection: &str, request: &ApiRequest) -> Reply {
        let name = request
            .query_value("name")
            .map(|f| f.strip_prefix("eq:").unwrap_or(f).to_string());

        let records = self
            .collections
            .get(collection)
            .map(|c| c.values().collect::<Vec<_>>())
            .unwrap_or_default()
            .into_iter()
            .filter(|r| match &name {
                Some(name) => r["name"].as_str() == Some(name.as_str()),
                None => true,
            })
            .map(|r| self.view(collection, r))
            .collect();

        ok_collection(records)
    }

    fn initiator(&self, address: &str) -> Reply {
        let found = self
            .collections
            .get("initiators")
            .and_then(|c| c.values().find(|r| r["address"].as_str() == Some(address)));
        match found {
            Some(record) => ok(record.clone()),
            None => api_error(404, "NOT_FOUND", &format!("initiator {} not found", address)),
        }
    }

    fn cluster_hosts(&self, cluster_id: i64) -> Reply {
        let hosts: Vec<Value> = self
            .collections
            .get("hosts")
            .map(|c| {
                c.values()
                    .filter(|r| r["host_cluster_id"].as_i64() == Some(cluster_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        ok(Value::Array(hosts))
    }

    fn get(&self, collection: &str, id: i64) -> Reply {
        match self.collections.get(collection).and_then(|c| c.get(&id)) {
            Some(record) => ok(self.view(collection, record)),
            None => api_error(404, "NOT_FOUND", &format!("{} {} not found", collection, id)),
        }
    }

    fn update(&mut self, collection: &str, id: i64, body: Option<&Value>) -> Reply {
        let changes = body.and_then(Value::as_object).cloned().unwrap_or_default();
        let updated = match self.collections.get_mut(collection).and_then(|c| c.get_mut(&id)) {
            Some(record) => {
                for (key, value) in changes {
                    record[key.as_str()] = value;
                }
                record.clone()
            }
            None => return api_error(404, "NOT_FOUND", &format!("{} {} not found", collection, id)),
        };
        ok(self.view(collection, &updated))
    }

    fn create_volume(&mut self, body: Option<&Value>) -> Reply {
        let mut record: Map<String, Value> = body.and_then(Value::as_object).cloned().unwrap_or_default();
        self.next_id += 1;
        let id = self.next_id;
        record.insert("id".into(), json!(id));

        if let Some(parent_id) = record.get("parent_id").and_then(Value::as_i64) {
            let parent = match self.collections.get("volumes").and_then(|c| c.get(&parent_id)) {
                Some(parent) => parent.clone(),
                None => return api_error(404, "NOT_FOUND", "parent volume not found"),
            };
            record.insert("pool_id".into(), parent["pool_id"].clone());
            record.insert("size".into(), parent["size"].clone());
            record.insert("type".into(), json!("SNAPSHOT"));
            record.insert("depth".into(), json!(parent["depth"].as_i64().unwrap_or_default() + 1));
        }

        let record = Value::Object(record);
        self.collections
            .entry("volumes".into())
            .or_default()
            .insert(id, record.clone());
        ok(self.view("volumes", &record))
    }

    fn delete_volume(&mut self, id: i64) -> Reply {
        if self.luns.iter().any(|l| l.volume_id == id) {
            return api_error(409, "VOLUME_MAPPED", "volume is mapped");
        }
        match self.collections.get_mut("volumes").and_then(|c| c.remove(&id)) {
            Some(record) => ok(record),
            None => api_error(404, "NOT_FOUND", &format!("volume {} not found", id)),
        }
    }

    fn luns_where(&self, pred: impl Fn(&Lun) -> bool) -> Reply {
        let luns: Vec<Value> = self
            .luns
            .iter()
            .filter(|l| pred(*l))
            .map(|l| serde_json::to_value(l).unwrap())
            .collect();
        ok(Value::Array(luns))
    }

    fn add_lun(&mut self, clustered: bool, owner: i64, body: Option<&Value>) -> Reply {
        let volume_id = body.and_then(|b| b["volume_id"].as_i64()).unwrap_or_default();
        let volume_exists = self
            .collections
            .get("volumes")
            .map_or(false, |c| c.contains_key(&volume_id));
        if !volume_exists {
            return api_error(404, "NOT_FOUND", &format!("volume {} not found", volume_id));
        }

        let owned = |l: &Lun| {
            if clustered {
                l.clustered && l.host_cluster_id == owner
            } else {
                !l.clustered && l.host_id == owner
            }
        };
        let number = match body.and_then(|b| b["lun"].as_i64()) {
            Some(n) => n,
            None => self.luns.iter().filter(|l| owned(*l)).map(|l| l.lun).max().unwrap_or(0) + 1,
        };

        self.next_id += 1;
        let lun = Lun {
            id: self.next_id,
            lun: number,
            clustered,
            host_cluster_id: if clustered { owner } else { 0 },
            volume_id,
            host_id: if clustered { 0 } else { owner },
        };
        self.luns.push(lun.clone());
        ok(serde_json::to_value(lun).unwrap())
    }

    fn delete_lun(&mut self, clustered: bool, owner: i64, number: i64) -> Reply {
        let position = self.luns.iter().position(|l| {
            l.lun == number
                && if clustered {
                    l.clustered && l.host_cluster_id == owner
                } else {
                    l.host_id == owner
                }
        });

        match position {
            Some(i) if !clustered && self.luns[i].is_cluster_owned() => api_error(
                409,
                "LUN_OWNED_BY_CLUSTER",
                "lun must be removed through its host cluster",
            ),
            Some(i) => ok(serde_json::to_value(self.luns.remove(i)).unwrap()),
            None => api_error(404, "LUN_NOT_FOUND", &format!("lun {} not found", number)),
        }
    }
}
