//! Typed bindings for the protocol contract surfaces the deploy scripts call.
//!
//! Construction goes through compiled artifacts, so only post-deployment
//! call surfaces are declared here.

use alloy::sol;

sol! {
    /// The pool factory's management surface
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IPoolFactory {
        function setFee(bool _stable, uint256 _fee) external;
        function setPauser(address _pauser) external;
        function setFeeManager(address _feeManager) external;
        function setVoter(address _voter) external;
        function createPool(address tokenA, address tokenB, bool stable) external returns (address pool);
        function getPool(address tokenA, address tokenB, bool stable) external view returns (address);
    }
}

sol! {
    /// The voting escrow's management surface
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IVotingEscrow {
        function setTeam(address _team) external;
    }
}

sol! {
    /// The voter's governance and gauge-creation surface
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IVoter {
        function setEmergencyCouncil(address _council) external;
        function setEpochGovernor(address _epochGovernor) external;
        function setGovernor(address _governor) external;
        function createGauge(address _poolFactory, address _pool) external returns (address);
    }
}

sol! {
    /// The minter's initialization surface
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IMinter {
        struct DistributionParams {
            address[] liquidWallets;
            uint256[] liquidAmounts;
            address[] lockedWallets;
            uint256[] lockedAmounts;
        }

        function initialize(DistributionParams memory params) external;
        function setTeam(address _team) external;
    }
}

sol! {
    /// The factory registry's ownership surface
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IFactoryRegistry {
        function transferOwnership(address newOwner) external;
    }
}

sol! {
    /// The airdrop distributor's distribution surface
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IAirdropDistributor {
        function distributeTokens(address[] memory _wallets, uint256[] memory _amounts) external;
        function renounceOwnership() external;
    }
}

sol! {
    /// The protocol governor's veto surface
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IProtocolGovernor {
        function setVetoer(address _vetoer) external;
    }
}
