use thiserror::Error;

/// Components that can put a value on the bus.
#[derive(Clone, Copy, Display, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum Driver {
    Memory,
    Segment,
    Register,
    Alu,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("{attempted_by} tried to drive the bus already driven by {held_by}")]
pub struct BusConflict {
    pub held_by: Driver,
    pub attempted_by: Driver,
}

/// The shared 16-bit data bus. At most one driver per phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bus {
    value: u16,
    driver: Option<Driver>,
}

impl Bus {
    pub fn new() -> Bus {
        Bus {
            value: 0,
            driver: None,
        }
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.driver = None;
    }

    pub fn drive(&mut self, driver: Driver, value: u16) -> Result<(), BusConflict> {
        if let Some(held_by) = self.driver {
            return Err(BusConflict {
                held_by,
                attempted_by: driver,
            });
        }

        self.value = value;
        self.driver = Some(driver);
        Ok(())
    }

    /// The driven value, or 0 while floating.
    pub fn sample(&self) -> u16 {
        match self.driver {
            Some(_) => self.value,
            None => 0,
        }
    }

    pub fn is_floating(&self) -> bool {
        self.driver.is_none()
    }

    pub fn driver(&self) -> Option<Driver> {
        self.driver
    }
}

impl Default for Bus {
    fn default() -> Self {
        Bus::new()
    }
}
