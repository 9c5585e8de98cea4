//! The supported broker/exchange formats, as data.
//!
//! Signal tokens are lowercase (detection lowercases the sample), non-trade
//! keywords are uppercase (the engine uppercases the action cell). Column
//! names are verbatim as they appear in each platform's export, ordered
//! newest revision first.

use super::{AdapterKind, AdapterSpec, ColumnMap, ExchangeColumns};

pub const CATALOG: &[AdapterSpec] = &[
    // crypto tax aggregator; the one exchange-style format in the catalog
    AdapterSpec {
        id: "koinly",
        brand_signals: &["koinly"],
        header_signals: &["sent amount", "received amount"],
        non_trade_keywords: &[
            "DEPOSIT",
            "WITHDRAWAL",
            "TRANSFER",
            "REWARD",
            "AIRDROP",
            "MINING",
            "STAKING",
            "GIFT",
            "LOST",
            "COST",
        ],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Exchange(ExchangeColumns {
            date: &["Koinly Date", "Date"],
            label: &["Label", "Type"],
            trade_labels: &["TRADE", "SWAP", "EXCHANGE"],
            pair: &["Pair"],
            sent_amount: "Sent Amount",
            sent_currency: "Sent Currency",
            received_amount: "Received Amount",
            received_currency: "Received Currency",
            price: &["Price"],
            fees: &["Fee Amount", "Fee"],
        }),
    },
    AdapterSpec {
        id: "coinbase",
        brand_signals: &["coinbase"],
        header_signals: &["quantity transacted"],
        non_trade_keywords: &[
            "SEND",
            "RECEIVE",
            "DEPOSIT",
            "WITHDRAWAL",
            "TRANSFER",
            "REWARD",
            "STAKING",
            "LEARN",
        ],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Timestamp"],
            ticker: &["Asset"],
            action: &["Transaction Type"],
            quantity: &["Quantity Transacted"],
            price: &[
                "Spot Price at Transaction",
                "USD Spot Price at Transaction",
                "Price",
            ],
            currency: &["Spot Price Currency"],
            fees: &["Fees and/or Spread", "Fees"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "trading212",
        brand_signals: &["trading 212", "trading212"],
        header_signals: &["no. of shares", "price / share"],
        non_trade_keywords: &["DIVIDEND", "INTEREST", "DEPOSIT", "WITHDRAWAL", "LENDING"],
        default_currency: "GBP",
        default_locale: "en-GB",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Time", "Date"],
            ticker: &["Ticker", "Instrument"],
            action: &["Action"],
            quantity: &["No. of shares", "Quantity"],
            price: &["Price / share", "Price"],
            currency: &["Currency (Price / share)", "Currency"],
            fees: &["Currency conversion fee", "Charge amount"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "ibkr_flex",
        brand_signals: &["interactive brokers"],
        header_signals: &["proceeds", "comm/fee"],
        non_trade_keywords: &["DIVIDEND", "INTEREST", "TRANSFER"],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Date/Time", "Trade Date", "Date"],
            ticker: &["Symbol", "Ticker", "Security"],
            action: &["Buy/Sell", "Action", "Type"],
            quantity: &["Quantity", "Qty", "Shares"],
            price: &["T. Price", "T.Price", "Trade Price", "Price"],
            currency: &["Currency"],
            fees: &["Comm/Fee", "Commission"],
            signed_quantity: true,
        }),
    },
    AdapterSpec {
        id: "freetrade",
        brand_signals: &["freetrade"],
        header_signals: &["price (native)", "currency (native)"],
        non_trade_keywords: &[
            "DIVIDEND",
            "INTEREST",
            "CASH TOP UP",
            "CASH WITHDRAWAL",
            "STOCK SPLIT",
            "FREESHARE",
        ],
        default_currency: "GBP",
        default_locale: "en-GB",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Date", "Timestamp"],
            ticker: &["Symbol", "Stock"],
            action: &["Type", "Action"],
            quantity: &["Quantity"],
            price: &["Price (native)", "Price"],
            currency: &["Currency (native)", "Account Currency"],
            fees: &["Fee (GBP)", "Stamp Duty (GBP)"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "revolut",
        brand_signals: &["revolut"],
        header_signals: &["price per share", "total amount"],
        non_trade_keywords: &[
            "DIVIDEND",
            "INTEREST",
            "TRANSFER",
            "TOP-UP",
            "TOP UP",
            "WITHDRAWAL",
            "CUSTODY FEE",
        ],
        default_currency: "GBP",
        default_locale: "en-GB",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Date", "Completed Date"],
            ticker: &["Ticker", "Stock", "Symbol"],
            action: &["Type", "Action"],
            quantity: &["Quantity"],
            price: &["Price per share", "Price"],
            currency: &["Currency"],
            fees: &["Fee", "Fees"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "robinhood",
        brand_signals: &["robinhood"],
        header_signals: &["activity date", "trans code"],
        non_trade_keywords: &[
            "CDIV",
            "DIVIDEND",
            "INTEREST",
            "ACH",
            "TRANSFER",
            "GOLD",
            "MARGIN",
        ],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Activity Date", "Date"],
            ticker: &["Instrument", "Symbol"],
            action: &["Trans Code", "Type"],
            quantity: &["Quantity"],
            price: &["Price"],
            currency: &["Currency"],
            fees: &[],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "webull",
        brand_signals: &["webull"],
        header_signals: &["avg price", "placed time"],
        non_trade_keywords: &["DIVIDEND", "INTEREST", "DEPOSIT", "WITHDRAWAL"],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Filled Time", "Placed Time", "Date"],
            ticker: &["Symbol", "Name"],
            action: &["Side", "Action"],
            quantity: &["Filled", "Total Qty", "Quantity"],
            price: &["Avg Price", "Price"],
            currency: &["Currency"],
            fees: &["Fee", "Commission"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "etoro",
        brand_signals: &["etoro"],
        header_signals: &["units", "open rate"],
        non_trade_keywords: &["DIVIDEND", "INTEREST", "DEPOSIT", "WITHDRAWAL", "ADJUSTMENT"],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Open Date", "Date"],
            ticker: &["Instrument", "Details"],
            action: &["Type", "Action"],
            quantity: &["Units"],
            price: &["Open Rate", "Price"],
            currency: &["Currency"],
            fees: &["Fees", "Spread"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "degiro",
        brand_signals: &["degiro"],
        header_signals: &["product", "isin"],
        non_trade_keywords: &[],
        default_currency: "EUR",
        default_locale: "nl-NL",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Date", "Datum"],
            ticker: &["Product", "Produkt"],
            action: &["Action", "Type"],
            quantity: &["Quantity", "Anzahl", "Number"],
            price: &["Price", "Kurs"],
            currency: &["Currency"],
            fees: &["Transaction and/or third party fees", "Transaction costs"],
            signed_quantity: true,
        }),
    },
    AdapterSpec {
        id: "schwab",
        brand_signals: &["schwab"],
        header_signals: &["fees & comm"],
        non_trade_keywords: &["DIVIDEND", "INTEREST", "TRANSFER", "JOURNAL", "WIRE"],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Date"],
            ticker: &["Symbol"],
            action: &["Action"],
            quantity: &["Quantity"],
            price: &["Price"],
            currency: &[],
            fees: &["Fees & Comm"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "fidelity",
        brand_signals: &["fidelity"],
        header_signals: &["run date", "price ($)"],
        non_trade_keywords: &["DIVIDEND", "INTEREST", "TRANSFER", "JOURNAL", "DISTRIBUTION"],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Run Date", "Date"],
            ticker: &["Symbol"],
            action: &["Action"],
            quantity: &["Quantity"],
            price: &["Price ($)", "Price"],
            currency: &[],
            fees: &["Commission ($)", "Fees ($)"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "vanguard",
        brand_signals: &["vanguard"],
        header_signals: &["trade date", "investment name"],
        non_trade_keywords: &[
            "DIVIDEND",
            "INTEREST",
            "TRANSFER",
            "SWEEP",
            "REINVESTMENT",
            "CONTRIBUTION",
        ],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Trade Date", "Settlement Date"],
            ticker: &["Symbol", "Investment Name"],
            action: &["Transaction Type"],
            quantity: &["Shares"],
            price: &["Share Price"],
            currency: &[],
            fees: &["Commission Fees", "Commission and Fees"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "binance",
        brand_signals: &["binance"],
        header_signals: &["date(utc)"],
        non_trade_keywords: &["DEPOSIT", "WITHDRAWAL", "DISTRIBUTION", "TRANSFER"],
        default_currency: "USDT",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Date(UTC)"],
            ticker: &["Market", "Pair"],
            action: &["Type", "Side"],
            quantity: &["Amount", "Executed", "Filled"],
            price: &["Price"],
            currency: &[],
            fees: &["Fee"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "kraken",
        brand_signals: &["kraken"],
        header_signals: &["ordertxid", "vol"],
        non_trade_keywords: &["DEPOSIT", "WITHDRAWAL", "TRANSFER", "STAKING"],
        default_currency: "USD",
        default_locale: "en-US",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["time"],
            ticker: &["pair"],
            action: &["type"],
            quantity: &["vol"],
            price: &["price"],
            currency: &[],
            fees: &["fee"],
            signed_quantity: false,
        }),
    },
    // weakest signals last so the specific formats above get first claim
    AdapterSpec {
        id: "saxo",
        brand_signals: &["saxo"],
        header_signals: &["trade date", "instrument"],
        non_trade_keywords: &["DIVIDEND", "INTEREST", "TRANSFER"],
        default_currency: "GBP",
        default_locale: "en-GB",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Trade Date", "Date", "Transaction Date"],
            ticker: &["Instrument", "Instrument Symbol", "Symbol", "Ticker"],
            action: &["Action", "Type"],
            quantity: &["Quantity", "Qty", "Shares"],
            price: &["Price", "Trade Price", "Execution Price"],
            currency: &["Currency"],
            fees: &["Commission"],
            signed_quantity: false,
        }),
    },
    AdapterSpec {
        id: "ig",
        brand_signals: &[],
        header_signals: &["market", "direction"],
        non_trade_keywords: &["DIVIDEND", "INTEREST", "TRANSFER", "FUNDING"],
        default_currency: "GBP",
        default_locale: "en-GB",
        kind: AdapterKind::Standard(ColumnMap {
            date: &["Date", "Trade Date"],
            ticker: &["Market", "Instrument"],
            action: &["Direction", "Activity", "Action", "Type"],
            quantity: &["Quantity", "Size"],
            price: &["Price", "Open level"],
            currency: &["Currency"],
            fees: &["Commission", "Charges"],
            signed_quantity: false,
        }),
    },
];

/// One representative header line per catalog entry, used by the detector
/// exclusivity tests.
#[cfg(test)]
pub fn sample_header(id: &str) -> &'static str {
    match id {
        "koinly" => {
            "Koinly Date,Pair,Sent Amount,Sent Currency,Received Amount,Received Currency,\
             Fee Amount,Fee Currency,Net Worth Amount,Net Worth Currency,Label,Description,TxHash"
        }
        "coinbase" => {
            "Timestamp,Transaction Type,Asset,Quantity Transacted,Spot Price Currency,\
             Spot Price at Transaction,Subtotal,Total (inclusive of fees and/or spread),\
             Fees and/or Spread,Notes"
        }
        "trading212" => {
            "Action,Time,ISIN,Ticker,Name,No. of shares,Price / share,\
             Currency (Price / share),Exchange rate,Total"
        }
        "ibkr_flex" => {
            "Symbol,Date/Time,Quantity,T. Price,C. Price,Proceeds,Comm/Fee,Basis,\
             Realized P/L,Code"
        }
        "freetrade" => {
            "Date,Time,Type,Symbol,Security,Quantity,Price (native),Currency (native),\
             FX rate (to GBP),Consideration (GBP),Fee (GBP),Stamp Duty (GBP),Total (GBP),\
             Notes,Order ID,Account"
        }
        "revolut" => "Date,Ticker,Type,Quantity,Price per share,Total Amount,Currency,FX Rate",
        "robinhood" => {
            "Activity Date,Process Date,Settle Date,Instrument,Description,Trans Code,\
             Quantity,Price,Amount"
        }
        "webull" => "Name,Symbol,Side,Status,Filled,Total Qty,Avg Price,Placed Time,Filled Time",
        "etoro" => {
            "Position ID,Action,Copy Trader Name,Amount,Units,Open Rate,Close Rate,Spread,\
             Profit,Open Date,Close Date,Take Profit Rate,Stop Loss Rate,Is Real,Leverage,Notes"
        }
        "degiro" => {
            "Date,Time,Product,ISIN,Exchange,Quantity,Price,Local value,Value,\
             Exchange rate,Transaction and/or third party fees,Total,Order ID"
        }
        "schwab" => "Date,Action,Symbol,Description,Quantity,Price,Fees & Comm,Amount",
        "fidelity" => {
            "Run Date,Action,Symbol,Security Description,Security Type,Quantity,Price ($),\
             Commission ($),Fees ($),Accrued Interest ($),Amount ($),Settlement Date"
        }
        "vanguard" => {
            "Account Number,Trade Date,Settlement Date,Transaction Type,\
             Transaction Description,Investment Name,Symbol,Shares,Share Price,\
             Principal Amount,Commission Fees,Net Amount"
        }
        "binance" => "Date(UTC),Market,Type,Price,Amount,Total,Fee,Fee Coin",
        "kraken" => "txid,ordertxid,pair,time,type,ordertype,price,cost,fee,vol,margin,misc,ledgers",
        "saxo" => {
            "Trade Date,Value Date,Instrument,Instrument Symbol,Action,Quantity,Price,\
             Currency,Booked Amount"
        }
        "ig" => "Date,Time,Activity,Market,Direction,Quantity,Price,Currency,Consideration,\
             Commission,Charges,Total",
        other => panic!("no sample header for adapter {}", other),
    }
}
