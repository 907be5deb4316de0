//! GraphQL documents for the launch-analytics provider
//!
//! All documents target the Solana dataset and filter on the pump.fun
//! program where the cube needs it.

/// pump.fun program address
pub const PUMP_PROGRAM: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

pub const TOP_HOLDERS: &str = r#"
query TopHolders($mint: String!) {
  Solana {
    BalanceUpdates(
      limit: { count: 10 }
      orderBy: { descendingByField: "BalanceUpdate_Holding_maximum" }
      where: {
        BalanceUpdate: { Currency: { MintAddress: { is: $mint } } }
        Transaction: { Result: { Success: true } }
      }
    ) {
      BalanceUpdate {
        Currency { Name MintAddress Symbol }
        Account { Address Token { Owner } }
        Holding: PostBalance(maximum: Block_Slot, selectWhere: { gt: "0" })
      }
    }
  }
}
"#;

pub const DEV_HOLDINGS: &str = r#"
query DevHoldings($dev: String!, $mint: String!) {
  Solana {
    BalanceUpdates(
      where: {
        BalanceUpdate: {
          Account: { Owner: { is: $dev } }
          Currency: { MintAddress: { is: $mint } }
        }
      }
    ) {
      BalanceUpdate {
        Account { Address }
        Currency { Name Symbol MintAddress }
        balance: PostBalance(maximum: Block_Slot)
      }
    }
  }
}
"#;

pub const VOLUME_AND_MARKET_CAP: &str = r#"
query VolumeAndMarketCap($mint: String!) {
  Solana {
    DEXTradeByTokens(
      where: {
        Trade: {
          Currency: { MintAddress: { is: $mint } }
          Side: { Type: { is: SIDE } }
        }
        Transaction: { Result: { Success: true } }
      }
    ) {
      Trade {
        Currency { Name Symbol MintAddress }
        PriceInUSD(maximum: Block_Time)
      }
      volume: sum(of: Trade_Side_AmountInUSD)
      trades: count
      marketcap: calculate(expression: "Trade_PriceInUSD * 1000000000")
    }
  }
}
"#;

pub const TOP_MARKET_CAP: &str = r#"
query TopMarketCap($program: String!) {
  Solana {
    DEXTrades(
      limitBy: { by: Trade_Buy_Currency_MintAddress, count: 1 }
      limit: { count: 10 }
      orderBy: { descending: Trade_Buy_Price }
      where: {
        Trade: {
          Dex: { ProgramAddress: { is: $program } }
          Buy: { Currency: { MintAddress: { notIn: ["11111111111111111111111111111111"] } } }
        }
        Transaction: { Result: { Success: true } }
      }
    ) {
      Trade {
        Buy {
          Price
          PriceInUSD
          Currency { Name Symbol MintAddress Decimals Fungible Uri }
        }
      }
    }
  }
}
"#;

pub const TOKEN_INFO: &str = r#"
query TokenInfo($mint: String!, $before: DateTime) {
  Solana {
    TokenSupplyUpdates(
      limit: { count: 1 }
      orderBy: { descending: Block_Time }
      where: {
        Block: { Time: { before: $before } }
        TokenSupplyUpdate: { Currency: { MintAddress: { is: $mint } } }
      }
    ) {
      Block { Time }
      TokenSupplyUpdate {
        Amount
        PostBalance
        Currency { Name Symbol MintAddress Decimals Uri UpdateAuthority }
      }
    }
  }
}
"#;

pub const TOP_CREATORS: &str = r#"
query TopCreators($program: String!) {
  Solana {
    Instructions(
      limit: { count: 10 }
      orderBy: { descendingByField: "tokens_count" }
      where: {
        Instruction: {
          Program: { Address: { is: $program }, Method: { is: "create" } }
        }
        Transaction: { Result: { Success: true } }
      }
    ) {
      Transaction { Signer }
      tokens_count: count
    }
  }
}
"#;

pub const TOP_TRADERS: &str = r#"
query TopTraders($mint: String!, $limit: Int!) {
  Solana {
    DEXTradeByTokens(
      limit: { count: $limit }
      orderBy: { descendingByField: "volumeUsd" }
      where: {
        Trade: { Currency: { MintAddress: { is: $mint } } }
        Transaction: { Result: { Success: true } }
      }
    ) {
      Trade { Account { Owner } }
      bought: sum(of: Trade_Amount, if: { Trade: { Side: { Type: { is: buy } } } })
      sold: sum(of: Trade_Amount, if: { Trade: { Side: { Type: { is: sell } } } })
      volume: sum(of: Trade_Amount)
      volumeUsd: sum(of: Trade_Side_AmountInUSD)
    }
  }
}
"#;

pub const VOLUME_BY_DEX: &str = r#"
query VolumeByDex($mint: String!, $since: DateTime!) {
  Solana {
    DEXTradeByTokens(
      orderBy: { descendingByField: "volumeUsd" }
      where: {
        Block: { Time: { since: $since } }
        Trade: { Currency: { MintAddress: { is: $mint } } }
        Transaction: { Result: { Success: true } }
      }
    ) {
      Trade { Dex { ProtocolFamily ProtocolName } }
      trades: count
      volumeUsd: sum(of: Trade_Side_AmountInUSD)
    }
  }
}
"#;

pub const FIRST_BUYERS: &str = r#"
query FirstBuyers($mint: String!, $limit: Int!) {
  Solana {
    DEXTrades(
      limit: { count: $limit }
      orderBy: { ascending: Block_Time }
      where: {
        Trade: { Buy: { Currency: { MintAddress: { is: $mint } } } }
        Transaction: { Result: { Success: true } }
      }
    ) {
      Block { Time }
      Trade {
        Buy { Amount AmountInUSD Account { Token { Owner } } }
      }
      Transaction { Signature }
    }
  }
}
"#;

pub const LATEST_TRADES: &str = r#"
query LatestTrades($mint: String!, $limit: Int!) {
  Solana {
    DEXTradeByTokens(
      limit: { count: $limit }
      orderBy: { descending: Block_Time }
      where: {
        Trade: { Currency: { MintAddress: { is: $mint } } }
        Transaction: { Result: { Success: true } }
      }
    ) {
      Block { Time }
      Trade {
        Amount
        AmountInUSD
        Price
        PriceInUSD
        Side { Type Account { Address } }
        Account { Owner }
        Dex { ProtocolName }
      }
      Transaction { Signature }
    }
  }
}
"#;

pub const HISTORICAL_PRICE_VOLUME: &str = r#"
query HistoricalPriceVolume($mint: String!, $since: DateTime!, $interval: Int!) {
  Solana {
    DEXTradeByTokens(
      orderBy: { ascendingByField: "Block_Timefield" }
      where: {
        Block: { Time: { since: $since } }
        Trade: { Currency: { MintAddress: { is: $mint } } }
        Transaction: { Result: { Success: true } }
      }
    ) {
      Block { Timefield: Time(interval: { in: UNIT, count: $interval }) }
      Trade {
        open: PriceInUSD(minimum: Block_Slot)
        high: PriceInUSD(maximum: Trade_PriceInUSD)
        low: PriceInUSD(minimum: Trade_PriceInUSD)
        close: PriceInUSD(maximum: Block_Slot)
      }
      volume: sum(of: Trade_Side_AmountInUSD)
    }
  }
}
"#;

pub const LAST_TRANSACTIONS: &str = r#"
query LastTransactions($mint: String!, $limit: Int!) {
  Solana {
    Transfers(
      limit: { count: $limit }
      orderBy: { descending: Block_Time }
      where: { Transfer: { Currency: { MintAddress: { is: $mint } } } }
    ) {
      Block { Time }
      Transfer {
        Amount
        AmountInUSD
        Sender { Owner }
        Receiver { Owner }
      }
      Transaction { Signature }
    }
  }
}
"#;

pub const CREATION_INFO: &str = r#"
query CreationInfo($mint: String!, $program: String!) {
  Solana {
    Instructions(
      limit: { count: 1 }
      where: {
        Instruction: {
          Accounts: { includes: { Address: { is: $mint } } }
          Program: { Address: { is: $program }, Method: { is: "create" } }
        }
        Transaction: { Result: { Success: true } }
      }
    ) {
      Block { Time }
      Transaction { Signer Signature }
      Instruction { Program { Method Arguments { Name Value { ... on Solana_ABI_String_Value_Arg { string } } } } }
    }
  }
}
"#;
