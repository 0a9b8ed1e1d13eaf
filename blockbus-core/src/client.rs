//! Host-side block client
//!
//! Talks to one block through an [`I2cBus`] master. Every call is a write
//! transaction carrying a frame, followed (for queries) by a read
//! transaction that collects the block's response.

use heapless::Vec;

use blockbus_hal::i2c::is_valid_address;
use blockbus_hal::I2cBus;
use blockbus_protocol::{
    BaseCommand, FrameError, ModuleVersion, PowerLevel, Request, Target, MAX_FRAME_SIZE,
};

use crate::extension::MAX_EXTENSION_ADDRESSES;

/// Errors from client operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClientError<E> {
    /// Bus transfer failed (block absent or not answering)
    Bus(E),
    /// Request could not be encoded
    Frame(FrameError),
    /// Address outside the 7-bit range
    InvalidAddress(u8),
    /// Block reported a different block type than expected
    UnexpectedBlockType { expected: u8, found: u8 },
    /// Block reported more data than fits the destination
    ResponseTooLong,
}

impl<E> From<FrameError> for ClientError<E> {
    fn from(e: FrameError) -> Self {
        ClientError::Frame(e)
    }
}

/// Connection to one block on the bus
pub struct BlockClient<B> {
    bus: B,
    address: u8,
    block_type_id: u8,
}

impl<B: I2cBus> BlockClient<B> {
    /// Create a client for a block of type `block_type_id`
    ///
    /// Without an explicit address the block is expected at its default
    /// address, which equals the block type id.
    pub fn new(bus: B, block_type_id: u8, address: Option<u8>) -> Self {
        Self {
            bus,
            address: address.unwrap_or(block_type_id),
            block_type_id,
        }
    }

    /// Current bus address of the block
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Block type this client talks to
    pub fn block_type_id(&self) -> u8 {
        self.block_type_id
    }

    /// Release the underlying bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Send a frame without reading a response
    pub fn write(&mut self, target: Target, command: u8, payload: &[u8]) -> Result<(), ClientError<B::Error>> {
        let request = Request::new(target, command, payload)?;
        let mut frame = [0u8; MAX_FRAME_SIZE];
        let len = request.encode(&mut frame)?;
        self.bus
            .write(self.address, &frame[..len])
            .map_err(ClientError::Bus)
    }

    /// Send a frame and read `response.len()` bytes back
    pub fn query(
        &mut self,
        target: Target,
        command: u8,
        payload: &[u8],
        response: &mut [u8],
    ) -> Result<(), ClientError<B::Error>> {
        self.write(target, command, payload)?;
        self.bus
            .read(self.address, response)
            .map_err(ClientError::Bus)
    }

    /// Send a device-specific command
    pub fn device_write(&mut self, command: u8, payload: &[u8]) -> Result<(), ClientError<B::Error>> {
        self.write(Target::Block(self.block_type_id), command, payload)
    }

    /// Send a device-specific command and read its response
    pub fn device_query(
        &mut self,
        command: u8,
        payload: &[u8],
        response: &mut [u8],
    ) -> Result<(), ClientError<B::Error>> {
        self.query(Target::Block(self.block_type_id), command, payload, response)
    }

    fn base_byte(&mut self, command: BaseCommand) -> Result<u8, ClientError<B::Error>> {
        let mut byte = [0u8; 1];
        self.query(Target::Base, command.to_byte(), &[], &mut byte)?;
        Ok(byte[0])
    }

    /// Read block type and hardware revision
    pub fn module_version(&mut self) -> Result<ModuleVersion, ClientError<B::Error>> {
        let mut bytes = [0u8; ModuleVersion::SIZE];
        self.query(
            Target::Base,
            BaseCommand::GetModuleVersion.to_byte(),
            &[],
            &mut bytes,
        )?;
        Ok(ModuleVersion {
            block_type_id: bytes[0],
            pcb: bytes[1],
            adjustment: bytes[2],
        })
    }

    /// Read the module version and check the block type
    pub fn verify_block_type(&mut self) -> Result<ModuleVersion, ClientError<B::Error>> {
        let version = self.module_version()?;
        if version.block_type_id != self.block_type_id {
            return Err(ClientError::UnexpectedBlockType {
                expected: self.block_type_id,
                found: version.block_type_id,
            });
        }
        Ok(version)
    }

    /// Move the block to a new bus address
    ///
    /// The block restarts to apply it; allow it a short while before the
    /// next transfer.
    pub fn change_address(&mut self, new_address: u8) -> Result<(), ClientError<B::Error>> {
        if !is_valid_address(new_address) {
            return Err(ClientError::InvalidAddress(new_address));
        }
        self.write(
            Target::Base,
            BaseCommand::ChangeBusAddress.to_byte(),
            &[new_address],
        )?;
        self.address = new_address;
        Ok(())
    }

    /// Number of extension slots
    pub fn extension_count(&mut self) -> Result<u8, ClientError<B::Error>> {
        self.base_byte(BaseCommand::GetExtensionCount)
    }

    /// Select an extension slot
    pub fn activate_extension(&mut self, index: u8) -> Result<(), ClientError<B::Error>> {
        self.write(
            Target::Base,
            BaseCommand::ActivateExtension.to_byte(),
            &[index],
        )
    }

    /// Address of the selected extension
    pub fn extension_address(&mut self) -> Result<u8, ClientError<B::Error>> {
        self.base_byte(BaseCommand::GetExtensionAddress)
    }

    /// Re-address the selected extension
    pub fn change_extension_address(&mut self, address: u8) -> Result<(), ClientError<B::Error>> {
        if !is_valid_address(address) {
            return Err(ClientError::InvalidAddress(address));
        }
        self.write(
            Target::Base,
            BaseCommand::ChangeExtensionAddress.to_byte(),
            &[address],
        )
    }

    /// Candidate addresses of the selected extension
    pub fn extension_address_list(
        &mut self,
    ) -> Result<Vec<u8, MAX_EXTENSION_ADDRESSES>, ClientError<B::Error>> {
        let len = self.base_byte(BaseCommand::GetExtensionAddressListLength)? as usize;
        if len > MAX_EXTENSION_ADDRESSES {
            return Err(ClientError::ResponseTooLong);
        }

        let mut buf = [0u8; MAX_EXTENSION_ADDRESSES];
        self.query(
            Target::Base,
            BaseCommand::GetExtensionAddressList.to_byte(),
            &[],
            &mut buf[..len],
        )?;

        let mut list = Vec::new();
        list.extend_from_slice(&buf[..len])
            .map_err(|_| ClientError::ResponseTooLong)?;
        Ok(list)
    }

    /// Request a power-save level
    pub fn set_power_level(&mut self, level: PowerLevel) -> Result<(), ClientError<B::Error>> {
        self.write(
            Target::Base,
            BaseCommand::SetPowerLevel.to_byte(),
            &[level.to_byte()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockConfig, Capabilities, ExtensionSupport};
    use crate::controller::{Action, BusController};
    use crate::handler::BlockHandler;
    use crate::response::ResponseBuffer;
    use blockbus_hal::gpio::NoRail;
    use blockbus_hal::{AddressStore, StoreError, ADDRESS_UNSET};
    use blockbus_protocol::FrameReader;

    const AMBIENT: u8 = 0x0F;
    const CMD_READ_TEMPERATURE: u8 = 0x01;

    struct AmbientBlock {
        sensor_address: u8,
        level: PowerLevel,
    }

    impl BlockHandler for AmbientBlock {
        fn process_command(
            &mut self,
            command: u8,
            _payload: &mut FrameReader<'_>,
            response: &mut ResponseBuffer,
        ) {
            if command == CMD_READ_TEMPERATURE {
                response.extend_from_slice(&215i16.to_le_bytes()).unwrap();
            }
        }

        fn fill_module_version(&mut self, response: &mut ResponseBuffer) {
            response.extend_from_slice(&[AMBIENT, 1, 0]).unwrap();
        }

        fn power_save(&mut self, level: PowerLevel) {
            self.level = level;
        }

        fn extension_address(&mut self, _extension: usize) -> u8 {
            self.sensor_address
        }

        fn change_extension_address(&mut self, _extension: usize, address: u8) {
            self.sensor_address = address;
        }
    }

    struct RamStore(u8);

    impl AddressStore for RamStore {
        fn read_address(&mut self) -> Result<u8, StoreError> {
            Ok(self.0)
        }

        fn write_address(&mut self, address: u8) -> Result<(), StoreError> {
            self.0 = address;
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Nack;

    /// Bus with a single block behind it
    struct LoopbackBus {
        block: BusController<AmbientBlock, RamStore, NoRail>,
        bound_address: u8,
        last_action: Action,
    }

    impl LoopbackBus {
        fn new() -> Self {
            let config = BlockConfig::new(AMBIENT)
                .with_version(1, 0)
                .with_capabilities(Capabilities {
                    extensions: ExtensionSupport::Multiple,
                    has_power_rail: false,
                    auto_deep_sleep: true,
                })
                .with_extension(&[0x76, 0x77])
                .unwrap()
                .with_extension(&[0x23, 0x5C])
                .unwrap();
            let handler = AmbientBlock {
                sensor_address: 0x76,
                level: PowerLevel::None,
            };
            let mut block = BusController::new(&config, handler, RamStore(ADDRESS_UNSET), NoRail).unwrap();
            let bound_address = block.bus_address();
            Self {
                block,
                bound_address,
                last_action: Action::None,
            }
        }

        fn restart(&mut self) {
            self.bound_address = self.block.bus_address();
        }
    }

    impl I2cBus for LoopbackBus {
        type Error = Nack;

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Nack> {
            if address != self.bound_address {
                return Err(Nack);
            }
            self.last_action = self.block.on_receive(data);
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Nack> {
            if address != self.bound_address {
                return Err(Nack);
            }
            let response = self.block.on_request();
            // Bytes the slave does not supply read as an idle (high) bus
            buf.fill(0xFF);
            let len = response.len().min(buf.len());
            buf[..len].copy_from_slice(&response[..len]);
            Ok(())
        }
    }

    #[test]
    fn test_module_version() {
        let mut client = BlockClient::new(LoopbackBus::new(), AMBIENT, None);
        let version = client.verify_block_type().unwrap();
        assert_eq!(version.pcb, 1);
        assert_eq!(version.adjustment, 0);
    }

    #[test]
    fn test_unexpected_block_type() {
        let mut client = BlockClient::new(LoopbackBus::new(), 0x0D, Some(AMBIENT));
        assert_eq!(
            client.verify_block_type(),
            Err(ClientError::UnexpectedBlockType {
                expected: 0x0D,
                found: AMBIENT
            })
        );
    }

    #[test]
    fn test_absent_block() {
        let mut client = BlockClient::new(LoopbackBus::new(), AMBIENT, Some(0x50));
        assert_eq!(client.module_version(), Err(ClientError::Bus(Nack)));
    }

    #[test]
    fn test_change_address() {
        let mut client = BlockClient::new(LoopbackBus::new(), AMBIENT, None);
        client.change_address(0x31).unwrap();
        assert_eq!(client.address(), 0x31);

        let mut bus = client.release();
        assert_eq!(bus.last_action, Action::Restart { address: 0x31 });
        bus.restart();

        let mut client = BlockClient::new(bus, AMBIENT, Some(0x31));
        assert!(client.verify_block_type().is_ok());
    }

    #[test]
    fn test_change_address_rejects_invalid() {
        let mut client = BlockClient::new(LoopbackBus::new(), AMBIENT, None);
        assert_eq!(client.change_address(0x80), Err(ClientError::InvalidAddress(0x80)));
        assert_eq!(client.address(), AMBIENT);
    }

    #[test]
    fn test_extension_walk() {
        let mut client = BlockClient::new(LoopbackBus::new(), AMBIENT, None);
        assert_eq!(client.extension_count().unwrap(), 2);
        assert_eq!(&client.extension_address_list().unwrap()[..], &[0x76, 0x77]);

        client.activate_extension(1).unwrap();
        assert_eq!(&client.extension_address_list().unwrap()[..], &[0x23, 0x5C]);

        client.change_extension_address(0x77).unwrap();
        assert_eq!(client.extension_address().unwrap(), 0x77);
    }

    #[test]
    fn test_device_query() {
        let mut client = BlockClient::new(LoopbackBus::new(), AMBIENT, None);
        let mut raw = [0u8; 2];
        client.device_query(CMD_READ_TEMPERATURE, &[], &mut raw).unwrap();
        assert_eq!(i16::from_le_bytes(raw), 215);
    }

    #[test]
    fn test_read_without_pending_response() {
        let mut client = BlockClient::new(LoopbackBus::new(), AMBIENT, None);
        client.set_power_level(PowerLevel::Light).unwrap();

        let mut bus = client.release();
        assert_eq!(bus.block.handler().level, PowerLevel::Light);

        let mut buf = [0u8; 2];
        bus.read(AMBIENT, &mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0xFF]);
    }

    #[test]
    fn test_deep_sleep_requests_cpu_sleep() {
        let mut client = BlockClient::new(LoopbackBus::new(), AMBIENT, None);
        client.set_power_level(PowerLevel::Deep).unwrap();
        assert_eq!(client.release().last_action, Action::Sleep);
    }
}
