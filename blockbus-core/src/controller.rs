//! Bus controller
//!
//! Owns all protocol state of a block and exposes the two bus events of the
//! slave peripheral:
//!
//! - [`BusController::on_receive`]: a write transaction (one frame) arrived
//! - [`BusController::on_request`]: the host reads the pending response
//!
//! Both take `&mut self`, so they can never interleave; every command runs
//! to completion before the next bus event is serviced. Effects that must
//! leave the protocol core (CPU sleep, device restart) are returned as an
//! [`Action`] for the runtime to carry out.

use heapless::Vec;

use blockbus_hal::{AddressStore, CpuSleep, OutputPin, SystemReset};
use blockbus_protocol::{BaseCommand, FrameReader, PowerLevel, BASE_TARGET_ID};

use crate::address::resolve_bus_address;
use crate::config::{BlockConfig, Capabilities, ConfigError, ExtensionSupport};
use crate::extension::{ExtensionRegistry, MAX_EXTENSION_ADDRESSES};
use crate::handler::BlockHandler;
use crate::power::PowerStateMachine;
use crate::response::{ResponseBuffer, RESPONSE_CAPACITY};

// The full address list must fit into one response
const _: () = assert!(MAX_EXTENSION_ADDRESSES <= RESPONSE_CAPACITY);

/// Follow-up required from the runtime after a frame was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Nothing to do
    None,
    /// Deep power save entered; put the CPU to sleep
    Sleep,
    /// New bus address persisted; restart the device to bind it
    Restart { address: u8 },
}

impl Action {
    /// Carry out the action on the platform
    ///
    /// Does not return for [`Action::Restart`].
    pub fn perform<C: CpuSleep, R: SystemReset>(self, cpu: &mut C, reset: &mut R) {
        match self {
            Action::None => {}
            Action::Sleep => cpu.sleep(),
            Action::Restart { .. } => reset.reset(),
        }
    }
}

/// Protocol state machine of one block
pub struct BusController<H, S, P> {
    block_type_id: u8,
    capabilities: Capabilities,
    registry: ExtensionRegistry,
    response: ResponseBuffer,
    power: PowerStateMachine,
    handler: H,
    store: S,
    rail: P,
}

impl<H, S, P> BusController<H, S, P>
where
    H: BlockHandler,
    S: AddressStore,
    P: OutputPin,
{
    /// Create a controller for the configured block
    ///
    /// The extension rail is switched on and the first extension slot is
    /// selected.
    pub fn new(config: &BlockConfig, handler: H, store: S, mut rail: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = config.registry()?;
        let capabilities = config.capabilities;

        if capabilities.has_power_rail {
            rail.set_high();
        }

        Ok(Self {
            block_type_id: config.block_type_id,
            capabilities,
            registry,
            response: ResponseBuffer::new(),
            power: PowerStateMachine::new(capabilities.has_power_rail, capabilities.auto_deep_sleep),
            handler,
            store,
            rail,
        })
    }

    /// Block type id, the target id of the device-specific protocol
    pub fn block_type_id(&self) -> u8 {
        self.block_type_id
    }

    /// Bus address to bind the slave peripheral to
    pub fn bus_address(&mut self) -> u8 {
        resolve_bus_address(&mut self.store, self.block_type_id)
    }

    /// Pending response bytes
    pub fn response(&self) -> &ResponseBuffer {
        &self.response
    }

    /// Extension slots and selection
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Power-save state
    pub fn power(&self) -> &PowerStateMachine {
        &self.power
    }

    /// Block hooks
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Block hooks, mutable (for state shared with other tasks)
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Address store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Extension power rail
    pub fn rail(&self) -> &P {
        &self.rail
    }

    /// Write transaction received
    pub fn on_receive(&mut self, bytes: &[u8]) -> Action {
        let mut reader = FrameReader::new(bytes);
        self.dispatch(&mut reader)
    }

    /// Read transaction requested
    ///
    /// Returns the bytes to transmit (possibly none) and empties the
    /// response buffer.
    pub fn on_request(&mut self) -> Vec<u8, RESPONSE_CAPACITY> {
        let pending = self.response.take();
        trace!("read phase: {} bytes", pending.len());
        pending
    }

    /// Interpret one frame
    ///
    /// On return every byte of `reader` has been consumed.
    pub fn dispatch(&mut self, reader: &mut FrameReader<'_>) -> Action {
        if reader.remaining() < 2 {
            trace!("malformed frame: {} bytes", reader.remaining());
            reader.drain();
            return Action::None;
        }

        let target = match reader.read() {
            Some(target) => target,
            None => return Action::None,
        };

        if target != BASE_TARGET_ID && target != self.block_type_id {
            let drained = reader.drain();
            trace!("frame for target {=u8:#x}, drained {} bytes", target, drained);
            return Action::None;
        }

        let command = match reader.read() {
            Some(command) => command,
            None => return Action::None,
        };

        self.response.clear();

        let action = if target == self.block_type_id {
            self.handler
                .process_command(command, reader, &mut self.response);
            Action::None
        } else {
            match BaseCommand::from_byte(command).filter(|c| self.supports(*c)) {
                Some(base) => self.execute(base, reader),
                None => {
                    debug!(
                        "unsupported base command {=u8:#x}, {} payload bytes dropped",
                        command,
                        reader.remaining()
                    );
                    Action::None
                }
            }
        };

        reader.drain();
        action
    }

    /// Whether this block implements `command`
    fn supports(&self, command: BaseCommand) -> bool {
        match command {
            BaseCommand::ActivateExtension => {
                self.capabilities.extensions == ExtensionSupport::Multiple
            }
            c if c.needs_extensions() => self.capabilities.extensions != ExtensionSupport::None,
            _ => true,
        }
    }

    fn execute(&mut self, command: BaseCommand, reader: &mut FrameReader<'_>) -> Action {
        match command {
            BaseCommand::GetExtensionCount => {
                let count = match self.capabilities.extensions {
                    ExtensionSupport::Single => 1,
                    _ => self.registry.count() as u8,
                };
                self.respond(&[count]);
            }
            BaseCommand::ActivateExtension => {
                if let Some(index) = reader.read() {
                    match self.registry.activate(index as usize) {
                        Ok(()) => debug!("extension {} active", index),
                        Err(e) => warn!("cannot activate extension {}: {}", index, e),
                    }
                }
            }
            BaseCommand::GetExtensionAddress => {
                if let Some(extension) = self.registry.active_index() {
                    let address = self.handler.extension_address(extension);
                    self.respond(&[address]);
                }
            }
            BaseCommand::ChangeExtensionAddress => {
                if let (Some(extension), Some(address)) =
                    (self.registry.active_index(), reader.read())
                {
                    self.handler.change_extension_address(extension, address);
                }
            }
            BaseCommand::GetExtensionAddressListLength => {
                if let Some(len) = self.registry.active_list_len() {
                    self.respond(&[len as u8]);
                }
            }
            BaseCommand::GetExtensionAddressList => {
                if let Some(list) = self.registry.active_list() {
                    if self.response.extend_from_slice(list).is_err() {
                        warn!("address list does not fit the response");
                    }
                }
            }
            BaseCommand::GetModuleVersion => {
                self.handler.fill_module_version(&mut self.response);
            }
            BaseCommand::SetPowerLevel => {
                return self.set_power_level(reader.read());
            }
            BaseCommand::ChangeBusAddress => {
                return self.change_bus_address(reader.read());
            }
        }
        Action::None
    }

    fn set_power_level(&mut self, level: Option<u8>) -> Action {
        let level = match level.and_then(PowerLevel::from_byte) {
            Some(level) => level,
            None => {
                warn!("invalid power level {}", level);
                return Action::None;
            }
        };

        debug!("power level {}", level);
        let handler = &mut self.handler;
        let sleep = self
            .power
            .set_level(level, &mut self.rail, |l| handler.power_save(l));

        if sleep {
            Action::Sleep
        } else {
            Action::None
        }
    }

    fn change_bus_address(&mut self, address: Option<u8>) -> Action {
        // A truncated frame must not restart the block
        let Some(address) = address else {
            debug!("bus address change without payload ignored");
            return Action::None;
        };

        match self.store.write_address(address) {
            Ok(()) => {
                info!("bus address {=u8:#x} stored, restarting", address);
                Action::Restart { address }
            }
            Err(e) => {
                error!("failed to store bus address: {}", e);
                Action::None
            }
        }
    }

    fn respond(&mut self, bytes: &[u8]) {
        if self.response.extend_from_slice(bytes).is_err() {
            warn!("response overflow");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbus_hal::{StoreError, ADDRESS_UNSET};
    use blockbus_protocol::ModuleVersion;
    use proptest::prelude::*;

    const BUTTON: u8 = 0x0D;
    const AMBIENT: u8 = 0x0F;

    // Device-specific test commands
    const CMD_STATUS: u8 = 0x01;
    const CMD_ECHO_NEXT: u8 = 0x02;
    const CMD_IGNORE_PAYLOAD: u8 = 0x03;

    /// Mock block recording every hook call
    #[derive(Default)]
    struct MockBlock {
        commands: Vec<(u8, usize), 16>,
        power_levels: Vec<PowerLevel, 16>,
        extension_addresses: [u8; 4],
    }

    impl BlockHandler for MockBlock {
        fn process_command(
            &mut self,
            command: u8,
            payload: &mut FrameReader<'_>,
            response: &mut ResponseBuffer,
        ) {
            self.commands.push((command, payload.remaining())).unwrap();
            match command {
                CMD_STATUS => response.push(0x42).unwrap(),
                CMD_ECHO_NEXT => {
                    if let Some(byte) = payload.read() {
                        response.push(byte.wrapping_add(1)).unwrap();
                    }
                }
                _ => {}
            }
        }

        fn fill_module_version(&mut self, response: &mut ResponseBuffer) {
            let version = ModuleVersion {
                block_type_id: BUTTON,
                pcb: 2,
                adjustment: 1,
            };
            response.extend_from_slice(&version.to_bytes()).unwrap();
        }

        fn power_save(&mut self, level: PowerLevel) {
            self.power_levels.push(level).unwrap();
        }

        fn extension_address(&mut self, extension: usize) -> u8 {
            self.extension_addresses[extension]
        }

        fn change_extension_address(&mut self, extension: usize, address: u8) {
            self.extension_addresses[extension] = address;
        }
    }

    /// Mock EEPROM byte
    #[derive(Clone)]
    struct MockStore {
        value: u8,
        writes: u8,
        fail: bool,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                value: ADDRESS_UNSET,
                writes: 0,
                fail: false,
            }
        }
    }

    impl AddressStore for MockStore {
        fn read_address(&mut self) -> Result<u8, StoreError> {
            Ok(self.value)
        }

        fn write_address(&mut self, address: u8) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Flash);
            }
            self.value = address;
            self.writes += 1;
            Ok(())
        }
    }

    /// Mock rail counting transitions
    #[derive(Default)]
    struct MockRail {
        high: bool,
        rises: u8,
        falls: u8,
    }

    impl OutputPin for MockRail {
        fn set_high(&mut self) {
            self.high = true;
            self.rises += 1;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.falls += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    type TestController = BusController<MockBlock, MockStore, MockRail>;

    fn plain_block() -> TestController {
        BusController::new(
            &BlockConfig::new(BUTTON),
            MockBlock::default(),
            MockStore::new(),
            MockRail::default(),
        )
        .unwrap()
    }

    fn block_with(extensions: ExtensionSupport, lists: &[&[u8]]) -> TestController {
        let mut config = BlockConfig::new(AMBIENT).with_capabilities(Capabilities {
            extensions,
            ..Capabilities::default()
        });
        for list in lists {
            config = config.with_extension(list).unwrap();
        }
        let handler = MockBlock {
            extension_addresses: [0x76, 0x40, 0x29, 0x00],
            ..MockBlock::default()
        };
        BusController::new(&config, handler, MockStore::new(), MockRail::default()).unwrap()
    }

    fn multi_block() -> TestController {
        block_with(
            ExtensionSupport::Multiple,
            &[&[0x76, 0x77], &[0x40, 0x41, 0x44, 0x45], &[0x29]],
        )
    }

    /// Send a base command and read back the response
    fn query(controller: &mut TestController, command: BaseCommand, payload: &[u8]) -> Vec<u8, RESPONSE_CAPACITY> {
        let mut frame: Vec<u8, 32> = Vec::new();
        frame.push(BASE_TARGET_ID).unwrap();
        frame.push(command.to_byte()).unwrap();
        frame.extend_from_slice(payload).unwrap();
        assert_eq!(controller.on_receive(&frame), Action::None);
        controller.on_request()
    }

    #[test]
    fn test_rail_energized_at_start() {
        let controller = plain_block();
        assert!(controller.rail().is_set_high());
        assert_eq!(controller.power().level(), PowerLevel::None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BlockConfig::new(AMBIENT).with_capabilities(Capabilities {
            extensions: ExtensionSupport::Multiple,
            ..Capabilities::default()
        });
        let result = BusController::new(&config, MockBlock::default(), MockStore::new(), MockRail::default());
        assert_eq!(result.err(), Some(ConfigError::MissingExtensions));
    }

    proptest! {
        #[test]
        fn prop_short_frames_are_discarded(bytes in proptest::collection::vec(any::<u8>(), 0..2)) {
            let mut controller = multi_block();
            let mut reader = FrameReader::new(&bytes);

            prop_assert_eq!(controller.dispatch(&mut reader), Action::None);
            prop_assert_eq!(reader.remaining(), 0);
            prop_assert!(controller.on_request().is_empty());
            prop_assert!(controller.handler().commands.is_empty());
            prop_assert_eq!(controller.registry().active_index(), Some(0));
            prop_assert_eq!(controller.store().writes, 0);
        }

        #[test]
        fn prop_foreign_frames_are_drained(
            target in any::<u8>().prop_filter("foreign target", |t| *t != BASE_TARGET_ID && *t != AMBIENT),
            rest in proptest::collection::vec(any::<u8>(), 1..=31),
        ) {
            let mut controller = multi_block();
            let mut frame = std::vec![target];
            frame.extend_from_slice(&rest);

            let mut reader = FrameReader::new(&frame);
            prop_assert_eq!(controller.dispatch(&mut reader), Action::None);
            // Target byte read, the other count - 1 bytes drained
            prop_assert_eq!(reader.position(), frame.len());
            prop_assert!(controller.on_request().is_empty());
            prop_assert!(controller.handler().commands.is_empty());
            prop_assert!(controller.handler().power_levels.is_empty());
            prop_assert_eq!(controller.store().writes, 0);
        }

        #[test]
        fn prop_unknown_base_commands_are_drained(
            command in any::<u8>().prop_filter("unknown command", |c| BaseCommand::from_byte(*c).is_none()),
            payload in proptest::collection::vec(any::<u8>(), 0..=30),
        ) {
            let mut controller = multi_block();
            let mut frame = std::vec![BASE_TARGET_ID, command];
            frame.extend_from_slice(&payload);

            let mut reader = FrameReader::new(&frame);
            prop_assert_eq!(controller.dispatch(&mut reader), Action::None);
            prop_assert_eq!(reader.remaining(), 0);
            prop_assert!(controller.on_request().is_empty());
        }

        #[test]
        fn prop_activation_bounds(index in any::<u8>()) {
            let mut controller = multi_block();
            query(&mut controller, BaseCommand::ActivateExtension, &[1]);

            let response = query(&mut controller, BaseCommand::ActivateExtension, &[index]);
            prop_assert!(response.is_empty());

            let expected = if (index as usize) < 3 { index as usize } else { 1 };
            prop_assert_eq!(controller.registry().active_index(), Some(expected));
        }
    }

    #[test]
    fn test_foreign_frame_keeps_pending_response() {
        let mut controller = multi_block();
        controller.on_receive(&[BASE_TARGET_ID, BaseCommand::GetExtensionCount.to_byte()]);
        controller.on_receive(&[0x22, 0x01, 0x02]);
        assert_eq!(&controller.on_request()[..], &[3]);
    }

    #[test]
    fn test_extension_count_is_stable() {
        let mut controller = multi_block();
        let first = query(&mut controller, BaseCommand::GetExtensionCount, &[]);
        let second = query(&mut controller, BaseCommand::GetExtensionCount, &[]);
        assert_eq!(&first[..], &[3]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_activate_selects_list() {
        let mut controller = multi_block();

        let list = query(&mut controller, BaseCommand::GetExtensionAddressList, &[]);
        assert_eq!(&list[..], &[0x76, 0x77]);

        query(&mut controller, BaseCommand::ActivateExtension, &[1]);
        let len = query(&mut controller, BaseCommand::GetExtensionAddressListLength, &[]);
        let list = query(&mut controller, BaseCommand::GetExtensionAddressList, &[]);
        assert_eq!(&len[..], &[4]);
        assert_eq!(&list[..], &[0x40, 0x41, 0x44, 0x45]);
    }

    #[test]
    fn test_activate_out_of_range_keeps_selection() {
        let mut controller = multi_block();
        query(&mut controller, BaseCommand::ActivateExtension, &[2]);

        let response = query(&mut controller, BaseCommand::ActivateExtension, &[3]);
        assert!(response.is_empty());

        let list = query(&mut controller, BaseCommand::GetExtensionAddressList, &[]);
        assert_eq!(&list[..], &[0x29]);
    }

    #[test]
    fn test_activate_without_index_is_ignored() {
        let mut controller = multi_block();
        query(&mut controller, BaseCommand::ActivateExtension, &[]);
        assert_eq!(controller.registry().active_index(), Some(0));
    }

    #[test]
    fn test_extension_address_delegated() {
        let mut controller = multi_block();

        let address = query(&mut controller, BaseCommand::GetExtensionAddress, &[]);
        assert_eq!(&address[..], &[0x76]);

        query(&mut controller, BaseCommand::ActivateExtension, &[1]);
        query(&mut controller, BaseCommand::ChangeExtensionAddress, &[0x44]);
        assert_eq!(controller.handler().extension_addresses[1], 0x44);

        let address = query(&mut controller, BaseCommand::GetExtensionAddress, &[]);
        assert_eq!(&address[..], &[0x44]);
    }

    #[test]
    fn test_single_extension_block() {
        let mut controller = block_with(ExtensionSupport::Single, &[&[0x3C, 0x3D]]);

        let count = query(&mut controller, BaseCommand::GetExtensionCount, &[]);
        assert_eq!(&count[..], &[1]);

        // Slot switching is not part of the single-extension protocol
        let response = query(&mut controller, BaseCommand::ActivateExtension, &[0]);
        assert!(response.is_empty());

        let list = query(&mut controller, BaseCommand::GetExtensionAddressList, &[]);
        assert_eq!(&list[..], &[0x3C, 0x3D]);
    }

    #[test]
    fn test_extension_commands_unsupported_without_extensions() {
        let mut controller = plain_block();

        for command in [
            BaseCommand::GetExtensionCount,
            BaseCommand::GetExtensionAddress,
            BaseCommand::GetExtensionAddressListLength,
            BaseCommand::GetExtensionAddressList,
        ] {
            assert!(query(&mut controller, command, &[]).is_empty());
        }

        let frame = [BASE_TARGET_ID, BaseCommand::ActivateExtension.to_byte(), 0x01];
        let mut reader = FrameReader::new(&frame);
        assert_eq!(controller.dispatch(&mut reader), Action::None);
        assert_eq!(reader.remaining(), 0);
        assert!(controller.on_request().is_empty());
    }

    #[test]
    fn test_bus_address_change_persists_and_restarts() {
        let mut controller = plain_block();
        assert_eq!(controller.bus_address(), BUTTON);

        let action = controller.on_receive(&[BASE_TARGET_ID, BaseCommand::ChangeBusAddress.to_byte(), 0x30]);
        assert_eq!(action, Action::Restart { address: 0x30 });
        assert!(controller.on_request().is_empty());

        // Simulated restart: a fresh controller over the same storage
        let store = controller.store().clone();
        let mut rebooted = BusController::new(
            &BlockConfig::new(BUTTON),
            MockBlock::default(),
            store,
            MockRail::default(),
        )
        .unwrap();
        assert_eq!(rebooted.bus_address(), 0x30);
    }

    #[test]
    fn test_bus_address_change_without_payload_is_noop() {
        let mut controller = plain_block();

        let action = controller.on_receive(&[BASE_TARGET_ID, BaseCommand::ChangeBusAddress.to_byte()]);
        assert_eq!(action, Action::None);
        assert_eq!(controller.store().writes, 0);
        assert_eq!(controller.bus_address(), BUTTON);
    }

    #[test]
    fn test_bus_address_store_failure_does_not_restart() {
        let mut store = MockStore::new();
        store.fail = true;
        let mut controller = BusController::new(
            &BlockConfig::new(BUTTON),
            MockBlock::default(),
            store,
            MockRail::default(),
        )
        .unwrap();

        let action = controller.on_receive(&[BASE_TARGET_ID, BaseCommand::ChangeBusAddress.to_byte(), 0x30]);
        assert_eq!(action, Action::None);
        assert_eq!(controller.bus_address(), BUTTON);
    }

    #[test]
    fn test_power_deep_then_none() {
        let mut controller = plain_block();
        let set_power = BaseCommand::SetPowerLevel.to_byte();

        let action = controller.on_receive(&[BASE_TARGET_ID, set_power, PowerLevel::Deep.to_byte()]);
        assert_eq!(action, Action::Sleep);
        assert!(controller.rail().is_set_low());
        assert!(controller.power().is_deep_sleep_active());

        // One rise at start-up
        assert_eq!(controller.rail().rises, 1);

        let action = controller.on_receive(&[BASE_TARGET_ID, set_power, PowerLevel::None.to_byte()]);
        assert_eq!(action, Action::None);
        assert!(controller.rail().is_set_high());
        assert_eq!(controller.rail().rises, 2);
        assert!(!controller.power().is_deep_sleep_active());

        controller.on_receive(&[BASE_TARGET_ID, set_power, PowerLevel::None.to_byte()]);
        assert_eq!(controller.rail().rises, 2);

        assert_eq!(
            &controller.handler().power_levels[..],
            &[PowerLevel::Deep, PowerLevel::None, PowerLevel::None]
        );
        assert!(controller.on_request().is_empty());
    }

    #[test]
    fn test_power_without_auto_sleep_or_rail() {
        let config = BlockConfig::new(BUTTON).with_capabilities(Capabilities {
            has_power_rail: false,
            auto_deep_sleep: false,
            ..Capabilities::default()
        });
        let mut controller =
            BusController::new(&config, MockBlock::default(), MockStore::new(), MockRail::default()).unwrap();

        let action = controller.on_receive(&[BASE_TARGET_ID, BaseCommand::SetPowerLevel.to_byte(), 2]);
        assert_eq!(action, Action::None);
        assert_eq!((controller.rail().rises, controller.rail().falls), (0, 0));
        assert_eq!(&controller.handler().power_levels[..], &[PowerLevel::Deep]);
    }

    #[test]
    fn test_invalid_power_level_ignored() {
        let mut controller = plain_block();
        let set_power = BaseCommand::SetPowerLevel.to_byte();

        assert_eq!(controller.on_receive(&[BASE_TARGET_ID, set_power, 7]), Action::None);
        assert_eq!(controller.on_receive(&[BASE_TARGET_ID, set_power]), Action::None);
        assert!(controller.handler().power_levels.is_empty());
        assert_eq!(controller.power().level(), PowerLevel::None);
    }

    #[test]
    fn test_module_version_delegated() {
        let mut controller = plain_block();
        let version = query(&mut controller, BaseCommand::GetModuleVersion, &[]);
        assert_eq!(&version[..], &[BUTTON, 2, 1]);
    }

    #[test]
    fn test_response_read_once() {
        let mut controller = plain_block();
        controller.on_receive(&[BASE_TARGET_ID, BaseCommand::GetModuleVersion.to_byte()]);

        assert_eq!(controller.response().len(), 3);
        assert_eq!(controller.on_request().len(), 3);
        assert_eq!(controller.response().len(), 0);
        assert!(controller.on_request().is_empty());
    }

    #[test]
    fn test_command_without_output_clears_stale_response() {
        let mut controller = plain_block();
        controller.on_receive(&[BASE_TARGET_ID, BaseCommand::GetModuleVersion.to_byte()]);
        controller.on_receive(&[BASE_TARGET_ID, BaseCommand::SetPowerLevel.to_byte(), 1]);
        assert!(controller.on_request().is_empty());
    }

    #[test]
    fn test_device_command_forwarded() {
        let mut controller = plain_block();

        controller.on_receive(&[BUTTON, CMD_STATUS]);
        assert_eq!(&controller.on_request()[..], &[0x42]);

        controller.on_receive(&[BUTTON, CMD_ECHO_NEXT, 0x10, 0x99]);
        assert_eq!(&controller.on_request()[..], &[0x11]);

        assert_eq!(
            &controller.handler().commands[..],
            &[(CMD_STATUS, 0), (CMD_ECHO_NEXT, 2)]
        );
    }

    #[test]
    fn test_device_command_leftovers_drained() {
        let mut controller = plain_block();
        let frame = [BUTTON, CMD_IGNORE_PAYLOAD, 1, 2, 3, 4];
        let mut reader = FrameReader::new(&frame);

        assert_eq!(controller.dispatch(&mut reader), Action::None);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_device_command_clears_previous_response() {
        let mut controller = plain_block();
        controller.on_receive(&[BASE_TARGET_ID, BaseCommand::GetModuleVersion.to_byte()]);
        controller.on_receive(&[BUTTON, CMD_IGNORE_PAYLOAD]);
        assert!(controller.on_request().is_empty());
    }

    struct MockCpu {
        sleeps: u8,
    }

    impl CpuSleep for MockCpu {
        fn sleep(&mut self) {
            self.sleeps += 1;
        }
    }

    struct PanicReset;

    impl SystemReset for PanicReset {
        fn reset(&mut self) -> ! {
            panic!("reset");
        }
    }

    #[test]
    fn test_perform_sleep() {
        let mut cpu = MockCpu { sleeps: 0 };
        Action::None.perform(&mut cpu, &mut PanicReset);
        Action::Sleep.perform(&mut cpu, &mut PanicReset);
        assert_eq!(cpu.sleeps, 1);
    }

    #[test]
    #[should_panic(expected = "reset")]
    fn test_perform_restart() {
        let mut cpu = MockCpu { sleeps: 0 };
        Action::Restart { address: 0x30 }.perform(&mut cpu, &mut PanicReset);
    }
}
