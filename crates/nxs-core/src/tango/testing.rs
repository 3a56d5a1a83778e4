//! In-memory devices for unit tests.

use crate::error::DeviceError;
use crate::tango::device::{Device, DeviceConnector};
use crate::tango::{DevState, DeviceName, TangoHost};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Handler = Box<dyn Fn(&MockDevice, &Value) -> Result<Value, DeviceError> + Send + Sync>;

pub struct MockDevice {
    name: String,
    replies: Mutex<HashMap<String, Value>>,
    handlers: Mutex<HashMap<String, Arc<Handler>>>,
    attributes: Mutex<HashMap<String, Value>>,
    states: Mutex<VecDeque<DevState>>,
    calls: Mutex<Vec<(String, Value)>>,
    unreachable: Mutex<bool>,
}

impl MockDevice {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            replies: Mutex::new(HashMap::new()),
            handlers: Mutex::new(HashMap::new()),
            attributes: Mutex::new(HashMap::new()),
            states: Mutex::new(VecDeque::from([DevState::On])),
            calls: Mutex::new(Vec::new()),
            unreachable: Mutex::new(false),
        }
    }

    pub fn with_reply(self, command: &str, reply: Value) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(command.to_string(), reply);
        self
    }

    pub fn with_handler<F>(self, command: &str, handler: F) -> Self
    where
        F: Fn(&MockDevice, &Value) -> Result<Value, DeviceError> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap()
            .insert(command.to_string(), Arc::new(Box::new(handler)));
        self
    }

    pub fn with_attribute(self, attribute: &str, value: Value) -> Self {
        self.set_attribute(attribute, value);
        self
    }

    /// States reported by successive `state()` calls; the last one sticks.
    pub fn with_states(self, states: &[DevState]) -> Self {
        *self.states.lock().unwrap() = states.iter().copied().collect();
        self
    }

    pub fn unreachable(self) -> Self {
        *self.unreachable.lock().unwrap() = true;
        self
    }

    pub fn set_attribute(&self, attribute: &str, value: Value) {
        self.attributes
            .lock()
            .unwrap()
            .insert(attribute.to_string(), value);
    }

    pub fn attribute(&self, attribute: &str) -> Option<Value> {
        self.attributes.lock().unwrap().get(attribute).cloned()
    }

    /// Commands and attribute writes in call order; writes are `write:<attr>`.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|(name, _)| name).collect()
    }
}

#[async_trait]
impl Device for MockDevice {
    fn name(&self) -> &str {
        &self.name
    }

    async fn command_inout(&self, command: &str, input: Value) -> Result<Value, DeviceError> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), input.clone()));

        let handler = self.handlers.lock().unwrap().get(command).cloned();
        if let Some(handler) = handler {
            return handler(self, &input);
        }
        self.replies
            .lock()
            .unwrap()
            .get(command)
            .cloned()
            .ok_or_else(|| DeviceError::NotFound {
                endpoint: format!("{}/commands/{}", self.name, command),
            })
    }

    async fn read_attribute(&self, attribute: &str) -> Result<Value, DeviceError> {
        self.attribute(attribute)
            .ok_or_else(|| DeviceError::NotFound {
                endpoint: format!("{}/attributes/{}", self.name, attribute),
            })
    }

    async fn write_attribute(&self, attribute: &str, value: Value) -> Result<(), DeviceError> {
        self.calls
            .lock()
            .unwrap()
            .push((format!("write:{}", attribute), value.clone()));
        self.set_attribute(attribute, value);
        Ok(())
    }

    async fn state(&self) -> Result<DevState, DeviceError> {
        if *self.unreachable.lock().unwrap() {
            return Err(DeviceError::Http {
                status: 0,
                endpoint: format!("{}/state", self.name),
                message: "connection refused".to_string(),
            });
        }
        let mut states = self.states.lock().unwrap();
        if states.len() > 1 {
            Ok(states.pop_front().unwrap_or(DevState::Unknown))
        } else {
            Ok(states.front().copied().unwrap_or(DevState::Unknown))
        }
    }

    async fn attribute_list(&self) -> Result<Vec<String>, DeviceError> {
        let mut names: Vec<String> = self.attributes.lock().unwrap().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

pub struct MockConnector {
    tango_host: TangoHost,
    devices: HashMap<String, Arc<MockDevice>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            tango_host: TangoHost::new("haso000", 10000),
            devices: HashMap::new(),
        }
    }

    pub fn with_device(mut self, device: MockDevice) -> Self {
        self.devices
            .insert(device.name().to_string(), Arc::new(device));
        self
    }

    pub fn device(&self, name: &str) -> Arc<MockDevice> {
        self.devices
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no mock device {}", name))
    }
}

impl DeviceConnector for MockConnector {
    fn tango_host(&self) -> &TangoHost {
        &self.tango_host
    }

    fn connect(&self, device: &DeviceName) -> Result<Arc<dyn Device>, DeviceError> {
        let key = match &device.host {
            Some(host) if host != &self.tango_host => device.to_string(),
            _ => device.path.clone(),
        };
        self.devices
            .get(&key)
            .cloned()
            .map(|device| device as Arc<dyn Device>)
            .ok_or_else(|| DeviceError::NotFound { endpoint: key })
    }
}
